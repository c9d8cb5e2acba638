//! The APU is ticked in lockstep with the rest of the bus, one M-cycle at a
//! time. Its frame sequencer has no clock of its own: it advances whenever
//! the divider register's bit 4 (bit 5 in double speed) falls, which the
//! timer reports to the bus.

use crate::gb_emu::GameBoyModel;
use crate::hardware::apu::noise_channel::NoiseChannel;
use crate::hardware::apu::square_channel::SquareWaveChannel;
use crate::hardware::apu::wave_channel::WaveformChannel;
use crate::hardware::mmu::INVALID_READ;

pub mod channel_features;
pub mod noise_channel;
pub mod square_channel;
pub mod wave_channel;

pub const APU_MEM_START: u16 = 0xFF10;
pub const APU_MEM_END: u16 = 0xFF2F;
pub const WAVE_SAMPLE_START: u16 = 0xFF30;
pub const WAVE_SAMPLE_END: u16 = 0xFF3F;

/// The amount of T-cycles between samples for a 44.1KHz output rate.
pub const SAMPLE_CYCLES: u32 = 95;
/// Samples produced per video frame, for pre-sizing the output buffer.
pub const SAMPLES_PER_FRAME: usize = 70224 / SAMPLE_CYCLES as usize + 1;

#[derive(Debug)]
pub struct APU {
    voice1: SquareWaveChannel,
    voice2: SquareWaveChannel,
    voice3: WaveformChannel,
    voice4: NoiseChannel,
    // The vins are unused by games, but kept for register fidelity.
    vin_l_enable: bool,
    vin_r_enable: bool,
    left_volume: u8,
    right_volume: u8,
    // Index 0-3 represent voice 1-4 enable respectively.
    left_channel_enable: [bool; 4],
    right_channel_enable: [bool; 4],
    global_sound_enable: bool,
    output_buffer: Vec<f32>,
    frame_sequencer_step: u8,
    sample_cycles: u32,
    model: GameBoyModel,
}

impl APU {
    pub fn new(model: GameBoyModel) -> Self {
        APU {
            voice1: SquareWaveChannel::default(),
            voice2: SquareWaveChannel::default(),
            voice3: WaveformChannel::new(),
            voice4: NoiseChannel::default(),
            vin_l_enable: false,
            vin_r_enable: false,
            left_volume: 7,
            right_volume: 7,
            left_channel_enable: [true; 4],
            right_channel_enable: [true, true, false, false],
            global_sound_enable: true,
            output_buffer: Vec::with_capacity(SAMPLES_PER_FRAME * 2),
            frame_sequencer_step: 0,
            sample_cycles: 0,
            model,
        }
    }

    /// Advance all channels by the given T-cycles, stepping the frame
    /// sequencer first when the divider pulsed this M-cycle.
    pub fn tick(&mut self, t_cycles: u16, sequencer_pulse: bool) {
        if self.global_sound_enable {
            if sequencer_pulse {
                self.tick_frame_sequencer();
            }

            self.voice1.tick_timer(t_cycles);
            self.voice2.tick_timer(t_cycles);
            self.voice3.tick_timer(t_cycles);
            self.voice4.tick_timer(t_cycles);
        }

        self.sample_cycles += t_cycles as u32;
        if self.sample_cycles >= SAMPLE_CYCLES {
            self.sample_cycles -= SAMPLE_CYCLES;
            self.generate_sample();
        }
    }

    /// The frame sequencer clocks lengths at 256Hz, sweeps at 128Hz and
    /// envelopes at 64Hz.
    fn tick_frame_sequencer(&mut self) {
        match self.frame_sequencer_step {
            0 | 4 => self.tick_length(),
            2 | 6 => {
                self.tick_length();
                self.tick_sweep();
            }
            7 => self.tick_envelope(),
            _ => {}
        }
        self.frame_sequencer_step = (self.frame_sequencer_step + 1) % 8;
    }

    /// Mix one mono sample from the current channel outputs and push it to
    /// the output buffer.
    fn generate_sample(&mut self) {
        let dac_outputs = [
            dac(self.voice1.output_volume(), self.voice1.dac_enabled()),
            dac(self.voice2.output_volume(), self.voice2.dac_enabled()),
            dac(self.voice3.output_volume(), self.voice3.dac_enabled()),
            dac(self.voice4.output_volume(), self.voice4.dac_enabled()),
        ];

        let mut left = 0f32;
        let mut right = 0f32;
        for (i, output) in dac_outputs.iter().enumerate() {
            if self.left_channel_enable[i] {
                left += *output;
            }
            if self.right_channel_enable[i] {
                right += *output;
            }
        }

        // NR50 volume scales 1..=8, normalised back against the four summed
        // channels at full volume.
        left *= (self.left_volume + 1) as f32 / 8.0;
        right *= (self.right_volume + 1) as f32 / 8.0;

        self.output_buffer.push((left + right) / 8.0);
    }

    pub fn get_audio_buffer(&self) -> &[f32] {
        &self.output_buffer
    }

    pub fn clear_audio_buffer(&mut self) {
        self.output_buffer.clear();
    }

    pub fn read_register(&self, address: u16) -> u8 {
        let address = address & 0xFF;
        match address {
            0x10..=0x14 => self.voice1.read_register(address),
            // 0xFF15 doesn't exist, voice 2 has no sweep.
            0x15 => INVALID_READ,
            0x16..=0x19 => self.voice2.read_register(address - 0x5),
            0x1A..=0x1E => self.voice3.read_register(address),
            0x1F..=0x23 => self.voice4.read_register(address),
            // APU global registers
            0x24 => {
                let mut output = (self.left_volume << 4) | self.right_volume;
                set_bit(&mut output, 7, self.vin_l_enable);
                set_bit(&mut output, 3, self.vin_r_enable);
                output
            }
            0x25 => {
                let mut output = 0;
                for i in 0..4 {
                    set_bit(&mut output, i as u8, self.right_channel_enable[i]);
                    set_bit(&mut output, i as u8 + 4, self.left_channel_enable[i]);
                }
                output
            }
            0x26 => {
                let mut output = 0x70;
                set_bit(&mut output, 7, self.global_sound_enable);
                set_bit(&mut output, 3, self.voice4.enabled());
                set_bit(&mut output, 2, self.voice3.enabled());
                set_bit(&mut output, 1, self.voice2.enabled());
                set_bit(&mut output, 0, self.voice1.enabled());
                output
            }
            0x27..=0x2F => INVALID_READ, // Unused registers, always read 0xFF
            _ => unreachable!("Out of bound APU register read: {}", address),
        }
    }

    pub fn write_register(&mut self, address: u16, value: u8) {
        let address = address & 0xFF;
        #[cfg(feature = "apu-logging")]
        log::trace!("APU write on address: {:#X} with value: {:#X}", address, value);

        // While powered off the register file is inert. The DMG leaves the
        // length counters writable; on CGB not even those are.
        if !self.global_sound_enable
            && address != 0x26
            && !(self.model.is_dmg() && [0x11, 0x16, 0x1B, 0x20].contains(&address))
        {
            log::debug!("Ignored APU write at 0x{:02X} while powered down", address);
            return;
        }

        let next_step = self.frame_sequencer_step;
        match address {
            0x10..=0x14 => self.voice1.write_register(address, value, next_step),
            0x15 => {}
            0x16..=0x19 => self.voice2.write_register(address - 0x5, value, next_step),
            0x1A..=0x1E => self
                .voice3
                .write_register(address, value, no_length_tick_next_step(next_step)),
            0x1F..=0x23 => self.voice4.write_register(address, value, next_step),
            0x24 => {
                self.vin_l_enable = test_bit(value, 7);
                self.vin_r_enable = test_bit(value, 3);
                self.right_volume = value & 0x07;
                self.left_volume = (value & 0x70) >> 4;
            }
            0x25 => {
                for i in 0..4 {
                    self.right_channel_enable[i] = test_bit(value, i as u8);
                    self.left_channel_enable[i] = test_bit(value, i as u8 + 4);
                }
            }
            0x26 => {
                let previous_enable = self.global_sound_enable;
                self.global_sound_enable = test_bit(value, 7);
                if !self.global_sound_enable {
                    self.reset();
                } else if !previous_enable {
                    // After a re-enable the sequencer restarts from step 0.
                    self.frame_sequencer_step = 0;
                }
            }
            0x27..=0x2F => {} // Writes to unused registers are silently ignored.
            _ => unreachable!(
                "Attempt to write to an unknown audio register: 0xFF{:02X} with val: {}",
                address, value
            ),
        }
    }

    pub fn read_wave_sample(&self, address: u16) -> u8 {
        self.voice3.read_register(address & 0xFF)
    }

    pub fn write_wave_sample(&mut self, address: u16, value: u8) {
        // Wave RAM stays accessible even while the APU is powered down.
        self.voice3.write_register(address & 0xFF, value, false)
    }

    fn tick_length(&mut self) {
        self.voice1.tick_length();
        self.voice2.tick_length();
        self.voice3.tick_length();
        self.voice4.tick_length();
    }

    fn tick_envelope(&mut self) {
        self.voice1.tick_envelope();
        self.voice2.tick_envelope();
        self.voice4.tick_envelope();
    }

    fn tick_sweep(&mut self) {
        self.voice1.tick_sweep();
    }

    /// Powering the APU down clears every register except the wave RAM and,
    /// on DMG, the length counters.
    fn reset(&mut self) {
        self.voice1.reset(self.model);
        self.voice2.reset(self.model);
        self.voice3.reset();
        self.voice4.reset(self.model);
        self.vin_l_enable = false;
        self.vin_r_enable = false;
        self.right_volume = 0;
        self.left_volume = 0;
        self.left_channel_enable = [false; 4];
        self.right_channel_enable = [false; 4];
        self.frame_sequencer_step = 0;
    }
}

/// Maps a channel amplitude (0-15) onto the [-1, +1] DAC output range. A
/// powered-down DAC emits silence.
fn dac(volume: u8, enabled: bool) -> f32 {
    if enabled {
        volume as f32 / 7.5 - 1.0
    } else {
        0.0
    }
}

/// Should the length counters *not* be clocked by the upcoming frame
/// sequencer step? Relevant for the trigger and enable quirks.
fn no_length_tick_next_step(next_frame_sequence_val: u8) -> bool {
    [1, 3, 5, 7].contains(&next_frame_sequence_val)
}

fn set_bit(output: &mut u8, bit: u8, set: bool) {
    if set {
        *output |= 1 << bit;
    }
}

fn test_bit(value: u8, bit: u8) -> bool {
    let mask = 1 << bit;
    (value & mask) == mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dmg_apu() -> APU {
        APU::new(GameBoyModel::DMG)
    }

    fn sequencer_tick(apu: &mut APU) {
        apu.tick(0, true);
    }

    #[test]
    fn test_sample_cadence() {
        let mut apu = dmg_apu();

        // One frame of M-cycles produces roughly 739 samples at 44.1KHz.
        for _ in 0..17556 {
            apu.tick(4, false);
        }

        let produced = apu.get_audio_buffer().len();
        assert_eq!(produced, 70224 / SAMPLE_CYCLES as usize);

        apu.clear_audio_buffer();
        assert!(apu.get_audio_buffer().is_empty());
    }

    #[test]
    fn test_nr52_channel_flags() {
        let mut apu = dmg_apu();
        assert_eq!(apu.read_register(0xFF26) & 0xF0, 0xF0);

        apu.write_register(0xFF12, 0xF0);
        apu.write_register(0xFF14, 0x80);
        assert_eq!(apu.read_register(0xFF26) & 0x0F, 0x01);
    }

    #[test]
    fn test_power_off_clears_registers() {
        let mut apu = dmg_apu();
        apu.write_register(0xFF24, 0x77);
        apu.write_register(0xFF12, 0xF3);

        apu.write_register(0xFF26, 0x00);

        assert_eq!(apu.read_register(0xFF26) & 0x80, 0);
        assert_eq!(apu.read_register(0xFF24), 0);
        assert_eq!(apu.read_register(0xFF12), 0);
    }

    #[test]
    fn test_writes_ignored_while_powered_off() {
        let mut apu = dmg_apu();
        apu.write_register(0xFF26, 0x00);

        apu.write_register(0xFF24, 0x77);
        assert_eq!(apu.read_register(0xFF24), 0);

        // Wave RAM writes always land.
        apu.write_wave_sample(0xFF30, 0x12);
        assert_eq!(apu.read_wave_sample(0xFF30), 0x12);

        apu.write_register(0xFF26, 0x80);
        assert_eq!(apu.read_register(0xFF26) & 0x80, 0x80);
    }

    #[test]
    fn test_frame_sequencer_length_cadence() {
        let mut apu = dmg_apu();
        apu.write_register(0xFF12, 0xF0);
        apu.write_register(0xFF11, 0x3F); // length counter = 1
        apu.write_register(0xFF14, 0x40); // length enable, no trigger

        apu.write_register(0xFF14, 0x80 | 0x40); // trigger with length enable
        assert_eq!(apu.read_register(0xFF26) & 0x1, 0x1);

        // Lengths clock on step 0; one tick suffices to stop the channel.
        sequencer_tick(&mut apu);
        assert_eq!(apu.read_register(0xFF26) & 0x1, 0x0);
    }
}
