//! The three clocked features shared between channels: length counters,
//! volume envelopes, and the channel 1 frequency sweep.

/// Length counter, clocked at 256Hz by the frame sequencer. When it runs out
/// with `length_enable` set the channel switches off.
#[derive(Default, Debug, Copy, Clone)]
pub struct LengthFeature {
    pub length_enable: bool,
    counter: u16,
}

impl LengthFeature {
    /// NRx1 write for the 64-step channels.
    pub fn write_register(&mut self, value: u8) {
        self.counter = 64 - (value & 0x3F) as u16;
    }

    /// NR31 write, the wave channel counts 256 steps.
    pub fn write_register_256(&mut self, value: u8) {
        self.counter = 256 - value as u16;
    }

    pub fn tick(&mut self, channel_enable: &mut bool) {
        if self.length_enable && self.counter > 0 {
            self.counter -= 1;
            if self.counter == 0 {
                *channel_enable = false;
            }
        }
    }

    /// Trigger behaviour: an expired counter reloads to the maximum. If the
    /// next frame sequencer step won't clock lengths, an enabled counter
    /// immediately loses one step (the extra length clock quirk).
    pub fn trigger(&mut self, next_step_no_length: bool) {
        self.trigger_with_max(next_step_no_length, 64);
    }

    pub fn trigger_256(&mut self, next_step_no_length: bool) {
        self.trigger_with_max(next_step_no_length, 256);
    }

    fn trigger_with_max(&mut self, next_step_no_length: bool, max: u16) {
        if self.counter == 0 {
            self.counter = max;
            if self.length_enable && next_step_no_length {
                self.counter -= 1;
            }
        }
    }

    /// Enabling the length counter in the first half of a sequencer period
    /// clocks it once on its own.
    pub fn second_half_enable_tick(&mut self, channel_enable: &mut bool, old_enable: bool) {
        if !old_enable && self.length_enable && self.counter > 0 {
            self.counter -= 1;
            if self.counter == 0 {
                *channel_enable = false;
            }
        }
    }
}

/// Volume envelope, clocked at 64Hz by the frame sequencer.
///
/// When the timer generates a clock and the envelope period is not zero, a
/// new volume is calculated by adding or subtracting one from the current
/// volume. If the new volume leaves the 0..=15 range the envelope stops until
/// the channel is triggered again.
#[derive(Default, Debug, Copy, Clone)]
pub struct EnvelopeFeature {
    pub volume: u8,
    pub volume_load: u8,
    pub envelope_add_mode: bool,
    envelope_enabled: bool,
    envelope_period_load_value: u8,
    envelope_period: u8,
}

impl EnvelopeFeature {
    pub fn tick(&mut self) {
        if self.envelope_enabled && self.envelope_period_load_value > 0 {
            self.envelope_period = self.envelope_period.saturating_sub(1);

            if self.envelope_period == 0 {
                self.envelope_period = self.envelope_period_load_value;
                if self.envelope_add_mode {
                    let new_val = self.volume + 1;
                    if new_val <= 15 {
                        self.volume = new_val;
                    } else {
                        self.envelope_enabled = false;
                    }
                } else {
                    let (new_val, overflow) = self.volume.overflowing_sub(1);
                    if !overflow {
                        self.volume = new_val;
                    } else {
                        self.envelope_enabled = false;
                    }
                }
            }
        }
    }

    /// Follows the behaviour when a channel is triggered.
    pub fn trigger(&mut self) {
        self.envelope_enabled = true;
        self.envelope_period = self.envelope_period_load_value;
        self.volume = self.volume_load;
    }

    /// The DAC is powered by the upper 5 bits of NRx2; switching it off also
    /// silences the channel immediately.
    pub fn dac_enabled(&self) -> bool {
        self.volume_load != 0 || self.envelope_add_mode
    }

    pub fn read_register(&self) -> u8 {
        (self.volume_load << 4)
            | self.envelope_period_load_value
            | if self.envelope_add_mode { 0x8 } else { 0 }
    }

    pub fn write_register(&mut self, value: u8) {
        self.volume_load = (value & 0xF0) >> 4;
        self.envelope_add_mode = (value & 0x8) == 0x8;
        self.envelope_period_load_value = value & 0x7;
        self.envelope_period = self.envelope_period_load_value;
    }
}

/// Channel 1 frequency sweep, clocked at 128Hz by the frame sequencer.
#[derive(Default, Debug, Copy, Clone)]
pub struct SweepFeature {
    sweep_period: u8,
    sweep_negate: bool,
    sweep_shift: u8,
    // Internal state
    sweep_enabled: bool,
    sweep_timer: u8,
    sweep_frequency_shadow: u16,
}

impl SweepFeature {
    pub fn read_register(&self) -> u8 {
        (self.sweep_period << 4) | self.sweep_shift | if self.sweep_negate { 0x8 } else { 0 }
    }

    pub fn write_register(&mut self, value: u8) {
        self.sweep_period = (value >> 4) & 0x7;
        self.sweep_negate = value & 0x8 == 0x8;
        self.sweep_shift = value & 0x7;
    }

    /// Trigger reloads the shadow register and timer, and with a non-zero
    /// shift runs the overflow check straight away.
    pub fn trigger_sweep(&mut self, channel_enable: &mut bool, frequency: u16) {
        self.sweep_frequency_shadow = frequency;
        self.sweep_timer = self.effective_period();
        self.sweep_enabled = self.sweep_period != 0 || self.sweep_shift != 0;
        if self.sweep_shift != 0 {
            self.next_frequency(channel_enable);
        }
    }

    pub fn tick(&mut self, channel_enable: &mut bool, frequency: &mut u16) {
        self.sweep_timer = self.sweep_timer.saturating_sub(1);
        if self.sweep_timer != 0 {
            return;
        }
        self.sweep_timer = self.effective_period();

        if self.sweep_enabled && self.sweep_period != 0 {
            let new_frequency = self.next_frequency(channel_enable);
            if new_frequency <= 2047 && self.sweep_shift != 0 {
                self.sweep_frequency_shadow = new_frequency;
                *frequency = new_frequency;
                // A second overflow check with the updated shadow register.
                self.next_frequency(channel_enable);
            }
        }
    }

    /// `shadow +/- shadow >> shift`, disabling the channel on 11-bit overflow.
    fn next_frequency(&mut self, channel_enable: &mut bool) -> u16 {
        let delta = self.sweep_frequency_shadow >> self.sweep_shift;
        let new_frequency = if self.sweep_negate {
            self.sweep_frequency_shadow.wrapping_sub(delta)
        } else {
            self.sweep_frequency_shadow + delta
        };
        if new_frequency > 2047 {
            *channel_enable = false;
        }
        new_frequency
    }

    fn effective_period(&self) -> u8 {
        if self.sweep_period == 0 {
            8
        } else {
            self.sweep_period
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_expiry_disables_channel() {
        let mut length = LengthFeature::default();
        let mut enabled = true;

        length.write_register(0x3E); // counter = 2
        length.length_enable = true;

        length.tick(&mut enabled);
        assert!(enabled);
        length.tick(&mut enabled);
        assert!(!enabled);

        // An expired counter no longer ticks.
        length.tick(&mut enabled);
    }

    #[test]
    fn test_envelope_decrease_until_silent() {
        let mut envelope = EnvelopeFeature::default();
        envelope.write_register(0x31); // volume 3, subtract, period 1
        envelope.trigger();

        for _ in 0..3 {
            envelope.tick();
        }
        assert_eq!(envelope.volume, 0);

        // Further ticks leave the volume pinned.
        envelope.tick();
        assert_eq!(envelope.volume, 0);
    }

    #[test]
    fn test_dac_power() {
        let mut envelope = EnvelopeFeature::default();
        envelope.write_register(0x00);
        assert!(!envelope.dac_enabled());

        envelope.write_register(0x08);
        assert!(envelope.dac_enabled());

        envelope.write_register(0x10);
        assert!(envelope.dac_enabled());
    }

    #[test]
    fn test_sweep_overflow_disables_channel() {
        let mut sweep = SweepFeature::default();
        let mut enabled = true;
        sweep.write_register(0x11); // period 1, add, shift 1

        // 0x7FF + (0x7FF >> 1) overflows the 11-bit range immediately.
        sweep.trigger_sweep(&mut enabled, 0x7FF);
        assert!(!enabled);
    }

    #[test]
    fn test_sweep_updates_frequency() {
        let mut sweep = SweepFeature::default();
        let mut enabled = true;
        let mut frequency = 0x100;
        sweep.write_register(0x11);
        sweep.trigger_sweep(&mut enabled, frequency);
        assert!(enabled);

        sweep.tick(&mut enabled, &mut frequency);
        assert_eq!(frequency, 0x180);
        assert!(enabled);
    }
}
