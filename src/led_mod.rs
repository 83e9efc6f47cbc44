//! Module for the LED strip
//!
//! Responsible for handling the WS2812B shift light strip. This is the only code that
//! talks to the strip: it waits for a new [`PixelBuffer`] and clocks it out over PWM + DMA.
//!
//! WS2812B Datasheet: [https://cdn-shop.adafruit.com/datasheets/WS2812B.pdf](https://cdn-shop.adafruit.com/datasheets/WS2812B.pdf)

use defmt::debug;
use embassy_stm32::Peri;
use embassy_stm32::peripherals::{DMA2_CH1, TIM2};
use embassy_stm32::timer::Channel;
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::signal::Signal;
use rgb_led_pwm_dma_maker::{LedDataComposition, LedDmaBuffer, RGB, calc_dma_buffer_length};
use tachometer::config_mod::{BRIGHTNESS, STRIP_LEN};
use tachometer::render_mod::PixelBuffer;

/// Latest frame for the strip. Older frames that were never shown are overwritten.
pub static PIXELS: Signal<ThreadModeRawMutex, PixelBuffer> = Signal::new();

/// Applies the global brightness and converts to the DMA encoder's pixel type.
fn to_led_array(pixels: &PixelBuffer) -> [RGB; STRIP_LEN] {
    let colors = pixels.as_slice();
    core::array::from_fn(|i| {
        let c = colors[i].scaled(BRIGHTNESS);
        RGB::new(c.r, c.g, c.b)
    })
}

/// Writes every frame published on [`PIXELS`] to the strip
#[embassy_executor::task]
pub async fn led_task(mut led_in: SimplePwm<'static, TIM2>, mut led_dma: Peri<'static, DMA2_CH1>) {
    // RESET_LENGTH = reset_period / data_transfer_time = 50us / 1.25us = 40
    const RESET_LENGTH: usize = 40;
    // Calculate the dma buffer's length at compile time
    const DMA_BUFFER_LEN: usize = calc_dma_buffer_length(8 * 3, STRIP_LEN, RESET_LENGTH);

    // The PWM period is one bit, 1.25us
    let max_duty = led_in.max_duty_cycle();
    // t1h = T1H / data_transfer_time * max_duty_cycle = 0.8us / 1.25us * max_duty_cycle
    let t1h = (max_duty as u32 * 16 / 25) as u16;
    // t0h = T0H / data_transfer_time * max_duty_cycle = 0.4us / 1.25us * max_duty_cycle
    let t0h = (max_duty as u32 * 8 / 25) as u16;
    debug!("WS2812 timing: max duty {}, t1h {}, t0h {}", max_duty, t1h, t0h);

    let mut dma_buffer = LedDmaBuffer::<DMA_BUFFER_LEN>::new(t1h, t0h, LedDataComposition::GRB);

    // Line idles low between frames
    led_in.channel(Channel::Ch1).enable();
    led_in.channel(Channel::Ch1).set_duty_cycle(0);

    loop {
        let pixels = PIXELS.wait().await;
        let led_array = to_led_array(&pixels);
        let _ = dma_buffer.set_dma_buffer(&led_array, None);
        led_in
            .waveform::<embassy_stm32::timer::Ch1>(led_dma.reborrow(), dma_buffer.get_dma_buffer())
            .await;
    }
}
