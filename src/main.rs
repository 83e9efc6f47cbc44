#![no_std]
#![no_main]

// Modules only used in the binary (not testable on host)
mod led_mod;

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::select;
use embassy_stm32::can::Can;
use embassy_stm32::gpio::{Level, Output, OutputType, Speed};
use embassy_stm32::peripherals::*;
use embassy_stm32::time::{Hertz, khz};
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::{Config, bind_interrupts, can};
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};
use embedded_can::Id;
use tachometer::can_mod::{FrameError, FrameListener};
use tachometer::config_mod::{CAN_BITRATE, TICK_MS, TachConfig};
use tachometer::mode_mod::DisplayMode;
use tachometer::tach_mod::Tachometer;
use tachometer::telemetry_mod::TelemetryState;
use {defmt_rtt as _, panic_probe as _};

use crate::led_mod::{PIXELS, led_task};

bind_interrupts!(struct Irqs {
    FDCAN2_IT0 => can::IT0InterruptHandler<FDCAN2>;
    FDCAN2_IT1 => can::IT1InterruptHandler<FDCAN2>;
});

/// Last known ECU readings. Written by the CAN task, copied out by the tach task.
static TELEMETRY: Mutex<ThreadModeRawMutex, TelemetryState> = Mutex::new(TelemetryState::new());

/// Raised after every frame that changed [`TELEMETRY`]
static TELEMETRY_UPDATED: Signal<ThreadModeRawMutex, ()> = Signal::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    /////////////////////////////////////////////////
    // Initialize Peripherals
    /////////////////////////////////////////////////

    ////////////////////////////////
    // Initialize Clock
    ////////////////////////////////
    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });
        config.rcc.pll = Some(Pll {
            source: PllSource::HSE,
            prediv: PllPreDiv::DIV1,
            mul: PllMul::MUL40,
            divp: Some(PllPDiv::DIV2), // 160 MHz PLLP
            divq: Some(PllQDiv::DIV4), // 80 MHz PLLQ
            divr: Some(PllRDiv::DIV2), // Main system clock at 160 MHz
        });
        config.rcc.mux.fdcansel = mux::Fdcansel::PLL1_Q;
        config.rcc.sys = Sysclk::PLL1_R;
    }
    let peripherals = embassy_stm32::init(config);

    ////////////////////////////////
    // Initialize CAN
    ////////////////////////////////
    let can_rx = peripherals.PB5;
    let can_tx = peripherals.PB6;
    let mut can = can::CanConfigurator::new(peripherals.FDCAN2, can_rx, can_tx, Irqs);

    // The ECU sends extended IDs only, let all of them through
    can.properties().set_extended_filter(
        can::filter::ExtendedFilterSlot::_0,
        can::filter::ExtendedFilter::accept_all_into_fifo1(),
    );
    // Nominal Baud Rate: 250kHz (PE3 ECU)
    can.set_bitrate(CAN_BITRATE);
    let can = can.start(can::OperatingMode::NormalOperationMode);
    info!("Configured CAN at {} bit/s", CAN_BITRATE);

    // Toggles on every received frame
    let activity_led = Output::new(peripherals.PB7, Level::High, Speed::Low);

    ////////////////////////////////
    // Initialize LED Strip
    ////////////////////////////////
    // One PWM period per WS2812B bit, 800kHz
    let led_pwm = SimplePwm::new(
        peripherals.TIM2,
        Some(PwmPin::new(peripherals.PA0, OutputType::PushPull)),
        None,
        None,
        None,
        khz(800),
        CountingMode::EdgeAlignedUp,
    );
    info!("Configured LED strip");

    ////////////////////////////////
    // Spawn Threads
    ////////////////////////////////
    spawner.spawn(led_task(led_pwm, peripherals.DMA2_CH1)).unwrap();
    spawner.spawn(tach_task(TachConfig::DEFAULT)).unwrap();
    spawner.spawn(can_task(can, activity_led)).unwrap();
}

/// Receives ECU frames and applies them to [`TELEMETRY`].
///
/// Never sleeps: the lock is only held for the decode and the state update.
#[embassy_executor::task]
async fn can_task(mut can: Can<'static>, mut activity_led: Output<'static>) {
    loop {
        match can.read().await {
            Ok(envelope) => {
                let (ts, rx_frame) = (envelope.ts, envelope.frame);
                activity_led.toggle();

                // Get ID
                let id = match rx_frame.header().id() {
                    Id::Standard(id) => u32::from(id.as_raw()),
                    Id::Extended(id) => id.as_raw(),
                };
                // Get data of CAN frame (up to 8 bytes)
                let data = rx_frame.data();
                let data = &data[..data.len().min(rx_frame.header().len() as usize)];
                trace!("Rx: {:x} {:02x}", id, data);

                let result = TELEMETRY.lock().await.on_frame(id, data, ts.as_millis());
                match result {
                    Ok(()) => TELEMETRY_UPDATED.signal(()),
                    Err(FrameError::Unrecognized(id)) => {
                        trace!("ID {:x} doesn't match an ECU package", id)
                    }
                    Err(err) => warn!("Dropped frame: {}", err),
                }
            }
            Err(err) => error!("Error in frame: {}", err),
        }
    }
}

/// Picks the display mode and repaints.
///
/// Runs every [`TICK_MS`] and right after each telemetry update.
#[embassy_executor::task]
async fn tach_task(config: TachConfig) {
    let mut tach = Tachometer::new(config);
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));

    loop {
        let telemetry = *TELEMETRY.lock().await;
        let now = Instant::now().as_millis();
        let outcome = tach.tick(&telemetry, now);

        match outcome.presence_changed {
            Some(true) => info!("ECU online"),
            Some(false) => warn!("ECU offline"),
            None => {}
        }
        if outcome.mode_changed {
            info!("Display mode: {}", outcome.mode);
            if outcome.mode == DisplayMode::BatteryStatus {
                info!("Battery: {} V", telemetry.snapshot(now).voltage());
            }
        }
        if outcome.dirty {
            PIXELS.signal(*tach.pixels());
        }

        select(ticker.next(), TELEMETRY_UPDATED.wait()).await;
    }
}
