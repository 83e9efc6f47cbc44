//! Pixel rendering for the static display modes
//!
//! Everything here writes into a [`PixelBuffer`] of [`STRIP_LEN`] pixels. Counts
//! derived from telemetry are clamped before they are used as indices, so a
//! misconfigured threshold can only give a wrong picture, never an out of bounds
//! write.

use crate::config_mod::{STRIP_LEN, TachConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Applies a global brightness the way NeoPixel strips do, `c * (brightness + 1) / 256`.
    pub const fn scaled(self, brightness: u8) -> Self {
        let factor = brightness as u16 + 1;
        Self {
            r: ((self.r as u16 * factor) >> 8) as u8,
            g: ((self.g as u16 * factor) >> 8) as u8,
            b: ((self.b as u16 * factor) >> 8) as u8,
        }
    }
}

pub const OFF: Rgb = Rgb::new(0, 0, 0);
pub const RED: Rgb = Rgb::new(255, 0, 0);
pub const DIM_RED: Rgb = Rgb::new(40, 0, 0);
pub const GREEN: Rgb = Rgb::new(0, 255, 0);
pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
pub const CYAN: Rgb = Rgb::new(0, 255, 255);
pub const BLUE: Rgb = Rgb::new(0, 0, 255);

/// One color per LED, index 0 first on the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: [Rgb; STRIP_LEN],
}

impl PixelBuffer {
    pub const fn new() -> Self {
        Self {
            pixels: [OFF; STRIP_LEN],
        }
    }

    pub fn clear(&mut self) {
        self.fill(OFF);
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels = [color; STRIP_LEN];
    }

    /// Clears the strip and paints the first `count` pixels. `count` is clamped to the strip.
    pub fn fill_leading(&mut self, count: usize, color: Rgb) {
        self.clear();
        let count = count.min(STRIP_LEN);
        self.pixels[..count].fill(color);
    }

    /// Ignores indices past the end of the strip.
    pub fn set(&mut self, index: usize, color: Rgb) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    pub fn as_slice(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Number of pixels that are not off
    pub fn lit(&self) -> usize {
        self.pixels.iter().filter(|p| **p != OFF).count()
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the last pixel of the rpm bar.
///
/// `ceil(rpm / ((redline - wake_up) / STRIP_LEN))`, clamped to the last pixel.
/// Integer math, so the result is exact.
pub fn rpm_bar_index(rpm: u16, config: &TachConfig) -> usize {
    let span = config.bar_span();
    let scaled = u32::from(rpm) * STRIP_LEN as u32;
    let leds = scaled.div_ceil(span) as usize;
    leds.min(STRIP_LEN - 1)
}

/// Number of pixels of the throttle bar, `ceil(tps * STRIP_LEN / 100)`.
pub fn throttle_bar_len(tps_tenths: u16) -> usize {
    let leds = (u32::from(tps_tenths) * STRIP_LEN as u32).div_ceil(1000) as usize;
    leds.min(STRIP_LEN)
}

/// Battery color by voltage, closed-open buckets:
/// below 10 V red, 10 to 12 V yellow, 12 to 13 V green, 13 V and above blue.
pub const fn battery_color(centivolts: u16) -> Rgb {
    match centivolts {
        0..1000 => RED,
        1000..1200 => YELLOW,
        1200..1300 => GREEN,
        _ => BLUE,
    }
}

/// Green bar from pixel 0 up to and including [`rpm_bar_index`].
pub fn render_rev_range(buffer: &mut PixelBuffer, rpm: u16, config: &TachConfig) {
    buffer.fill_leading(rpm_bar_index(rpm, config) + 1, GREEN);
}

/// Same geometry as the rev range, in yellow.
pub fn render_shift_point(buffer: &mut PixelBuffer, rpm: u16, config: &TachConfig) {
    buffer.fill_leading(rpm_bar_index(rpm, config) + 1, YELLOW);
}

pub fn render_throttle(buffer: &mut PixelBuffer, tps_tenths: u16) {
    buffer.fill_leading(throttle_bar_len(tps_tenths), CYAN);
}

/// Whole strip in the battery color. Dark until a voltage has been received.
pub fn render_battery(buffer: &mut PixelBuffer, centivolts: Option<u16>) {
    match centivolts {
        Some(cv) => buffer.fill(battery_color(cv)),
        None => buffer.clear(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn shift_point_example() {
        // 10500 / 16 = 656.25 rpm per led, ceil(9500 / 656.25) = 15
        let config = TachConfig::DEFAULT;
        assert_eq!(rpm_bar_index(9500, &config), 15);

        let mut buffer = PixelBuffer::new();
        render_shift_point(&mut buffer, 9500, &config);
        assert!(buffer.as_slice().iter().all(|p| *p == YELLOW));
    }

    #[test]
    fn rev_range_paints_inclusive_index() {
        let config = TachConfig::DEFAULT;
        let mut buffer = PixelBuffer::new();
        // ceil(3000 / 656.25) = 5, pixels 0..=5
        render_rev_range(&mut buffer, 3000, &config);
        assert_eq!(buffer.lit(), 6);
        assert!(buffer.as_slice()[..6].iter().all(|p| *p == GREEN));
        assert!(buffer.as_slice()[6..].iter().all(|p| *p == OFF));
    }

    #[test]
    fn exact_multiple_is_not_rounded_up() {
        // 2625 rpm is exactly 4 leds worth
        assert_eq!(rpm_bar_index(2625, &TachConfig::DEFAULT), 4);
        assert_eq!(rpm_bar_index(2626, &TachConfig::DEFAULT), 5);
    }

    #[test]
    fn rpm_bar_is_clamped_for_narrow_span() {
        let config = TachConfig::new(100, 110, 120).unwrap();
        assert_eq!(rpm_bar_index(u16::MAX, &config), STRIP_LEN - 1);
    }

    #[test]
    fn throttle_example() {
        assert_eq!(throttle_bar_len(250), 4);
        let mut buffer = PixelBuffer::new();
        render_throttle(&mut buffer, 250);
        assert_eq!(buffer.as_slice()[..4], [CYAN; 4]);
        assert_eq!(buffer.lit(), 4);
    }

    #[test]
    fn throttle_bar_limits() {
        assert_eq!(throttle_bar_len(0), 0);
        assert_eq!(throttle_bar_len(1), 1);
        assert_eq!(throttle_bar_len(1000), STRIP_LEN);
        // the ECU field is 16 bits, values past 100 % still fit the strip
        assert_eq!(throttle_bar_len(u16::MAX), STRIP_LEN);
    }

    #[test]
    fn battery_buckets() {
        assert_eq!(battery_color(0), RED);
        assert_eq!(battery_color(999), RED);
        assert_eq!(battery_color(1000), YELLOW);
        assert_eq!(battery_color(1140), YELLOW);
        assert_eq!(battery_color(1199), YELLOW);
        assert_eq!(battery_color(1200), GREEN);
        assert_eq!(battery_color(1299), GREEN);
        assert_eq!(battery_color(1300), BLUE);
        assert_eq!(battery_color(1450), BLUE);
    }

    #[test]
    fn battery_fills_strip() {
        let mut buffer = PixelBuffer::new();
        render_battery(&mut buffer, Some(1140));
        assert!(buffer.as_slice().iter().all(|p| *p == YELLOW));
        render_battery(&mut buffer, None);
        assert_eq!(buffer.lit(), 0);
    }

    #[test]
    fn set_ignores_out_of_range() {
        let mut buffer = PixelBuffer::new();
        buffer.set(STRIP_LEN, RED);
        buffer.set(STRIP_LEN - 1, RED);
        assert_eq!(buffer.lit(), 1);
    }

    #[test]
    fn brightness_scaling() {
        assert_eq!(RED.scaled(255), RED);
        assert_eq!(RED.scaled(0), OFF);
        assert_eq!(Rgb::new(255, 128, 40).scaled(127), Rgb::new(127, 64, 20));
    }

    proptest! {
        #[test]
        fn rev_range_matches_rpm_per_led(rpm in 1u16..9000) {
            let config = TachConfig::DEFAULT;
            let rpm_per_led = f64::from(config.bar_span()) / STRIP_LEN as f64;
            let expected = (f64::from(rpm) / rpm_per_led).ceil() as usize;
            let expected = expected.min(STRIP_LEN - 1);

            let mut buffer = PixelBuffer::new();
            render_rev_range(&mut buffer, rpm, &config);
            prop_assert_eq!(rpm_bar_index(rpm, &config), expected);
            prop_assert_eq!(buffer.lit(), expected + 1);
        }

        #[test]
        fn bars_never_overflow(rpm in any::<u16>(), tps in any::<u16>()) {
            let config = TachConfig::DEFAULT;
            prop_assert!(rpm_bar_index(rpm, &config) < STRIP_LEN);
            prop_assert!(throttle_bar_len(tps) <= STRIP_LEN);
        }
    }
}
