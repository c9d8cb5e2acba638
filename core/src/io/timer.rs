use crate::io::interrupts::InterruptFlags;
use crate::io::timer::InputClock::C256;

/// This register is incremented at a rate of 16384Hz, exposing the upper 8 bits
/// of the internal 16-bit divider. Writing any value to this register resets it to 00h.
///
/// Note: The divider is affected by CGB double speed mode, and will increment at 32768Hz in double speed.
pub const DIVIDER_REGISTER: u16 = 0xFF04;
/// This timer is incremented by a clock frequency specified by the TAC register ($FF07).
/// When the value overflows (gets bigger than FFh) then it will be reset to the value
/// specified in TMA (FF06), and an interrupt will be requested.
pub const TIMER_COUNTER: u16 = 0xFF05;
/// When the TIMA overflows, this data will be loaded.
pub const TIMER_MODULO: u16 = 0xFF06;
/// Several flags to indicate incrementing rate of the timer.
pub const TIMER_CONTROL: u16 = 0xFF07;

/// Falling edges of this bit of the internal divider clock the APU frame
/// sequencer at 512Hz (bit 5 of DIV, so bit 13 internally, in double speed).
const SEQUENCER_BIT: u16 = 0x1000;
const SEQUENCER_BIT_DOUBLE_SPEED: u16 = 0x2000;

#[derive(Debug, Copy, Clone, PartialEq)]
enum InputClock {
    C16 = 0x1,
    C64 = 0x2,
    C256 = 0x3,
    C1024 = 0x0,
}

#[derive(Debug, Copy, Clone)]
pub struct TimerControl {
    timer_enabled: bool,
    input_select: InputClock,
}

#[derive(Debug, Default)]
pub struct TimerRegisters {
    pub system_clock: u16,
    pub timer_counter: u8,
    pub timer_modulo: u8,
    pub timer_control: TimerControl,
    timer_overflowed: bool,
    just_overflowed: bool,
    sequencer_bit: u16,
    sequencer_pulse: bool,
}

impl TimerRegisters {
    pub fn divider_register(&self) -> u8 {
        (self.system_clock >> 8) as u8
    }

    /// Advance the divider by one M-cycle (4 T-cycles) and derive TIMA edges.
    ///
    /// Returns a timer interrupt on the cycle TIMA is reloaded from TMA, one
    /// M-cycle after the actual overflow.
    pub fn tick_timers(&mut self) -> Option<InterruptFlags> {
        let mut to_return = None;
        self.just_overflowed = false;

        // The reload and interrupt happen one full M-cycle after overflow,
        // during which TIMA reads 0.
        if self.timer_overflowed {
            self.timer_counter = self.timer_modulo;
            self.timer_overflowed = false;
            self.just_overflowed = true;
            to_return = Some(InterruptFlags::TIMER)
        }

        let old_sys_clock = self.system_clock;
        self.system_clock = self.system_clock.wrapping_add(4);

        if self.fallen_sys_clock(old_sys_clock, self.sequencer_select_bit()) {
            self.sequencer_pulse = true;
        }

        if self.timer_control.timer_enabled {
            let select_bit = self.timer_control.input_select.to_relevant_bit();

            if self.fallen_sys_clock(old_sys_clock, select_bit) {
                self.tick_timer();
            }
        }

        to_return
    }

    /// Take the pending APU frame sequencer pulse, if any divider bit fell
    /// since the last call.
    pub fn take_sequencer_pulse(&mut self) -> bool {
        let result = self.sequencer_pulse;
        self.sequencer_pulse = false;
        result
    }

    pub fn set_double_speed(&mut self, double_speed: bool) {
        self.sequencer_bit = if double_speed {
            SEQUENCER_BIT_DOUBLE_SPEED
        } else {
            SEQUENCER_BIT
        };
    }

    fn sequencer_select_bit(&self) -> u16 {
        if self.sequencer_bit == 0 {
            SEQUENCER_BIT
        } else {
            self.sequencer_bit
        }
    }

    fn fallen_sys_clock(&self, old_clock: u16, select_bit: u16) -> bool {
        (old_clock & select_bit) != 0 && (self.system_clock & select_bit) == 0
    }

    fn tick_timer(&mut self) {
        let (new_value, overflowed) = self.timer_counter.overflowing_add(1);

        self.timer_counter = new_value;
        // If we overflow, we'll set the timer_counter and send the interrupt in the next iteration.
        self.timer_overflowed = overflowed;
    }

    /// Write to the `TIMA` register (`timer_counter` internally).
    ///
    /// If written to in the 4 clock period before an overflow interrupt, then the interrupt
    /// will be cancelled.
    pub fn set_timer_counter(&mut self, value: u8) {
        // If you write to the TIMA register in the 4 clocks that it has overflowed, but
        // not yet reset, then you can prevent the interrupt and TMA load from happening.
        if self.timer_overflowed && self.timer_counter == 0 {
            self.timer_overflowed = false;
        }

        // If you write to TIMA during the cycle that TMA is being loaded to it, the write
        // will be ignored and the TMA value will be written to TIMA instead.
        if self.just_overflowed {
            self.timer_counter = self.timer_modulo;
        } else {
            self.timer_counter = value;
        }
    }

    /// Write to the `TMA` register (internally `timer_modulo`) and update
    /// `timer_counter` as appropriate.
    pub fn set_tma(&mut self, value: u8) {
        // If TMA is written to during the same period as we overflow this new value is used
        // instead of the 'old' value.
        if self.just_overflowed {
            self.timer_counter = value;
        }
        self.timer_modulo = value;
    }

    /// Write to the divider register, this will always reset it to 0x00.
    pub fn set_divider(&mut self) {
        let old_sys_clock = self.system_clock;
        self.system_clock = 0;

        // If we've already halfway passed our cycle count then we'll increase our timer
        // due to the falling edge detector in the DMG.
        if self.timer_control.timer_enabled
            && (old_sys_clock & self.timer_control.input_select.to_relevant_bit()) != 0
        {
            self.tick_timer();
        }

        // The frame sequencer shares the divider, so resetting DIV can also
        // clock it early.
        if (old_sys_clock & self.sequencer_select_bit()) != 0 {
            self.sequencer_pulse = true;
        }
    }

    pub fn set_timer_control(&mut self, value: u8) {
        let old_control = self.timer_control;
        self.timer_control = TimerControl::from(value);
        let old_select_bit = old_control.input_select.to_relevant_bit();
        let select_bit = self.timer_control.input_select.to_relevant_bit();

        // When disabling the timer the DMG will increment the timer register if our system clock
        // was already half way through its cycle due to the falling edge detector.
        if old_control.timer_enabled
            && !self.timer_control.timer_enabled
            && (self.system_clock & select_bit) != 0
        {
            self.tick_timer();
        }

        // If the old selected bit by the multiplexer was 1, and the newly selected
        // bit is 0 while the timer remains enabled, the edge detector sees a fall
        // and increments TIMA.
        if old_control.timer_enabled
            && self.timer_control.timer_enabled
            && (self.system_clock & old_select_bit) != 0
            && (self.system_clock & select_bit) == 0
        {
            self.tick_timer()
        }
    }
}

impl TimerControl {
    pub fn to_bits(&self) -> u8 {
        let result = if self.timer_enabled { 0x4 } else { 0 };

        0xF8 | result | self.input_select as u8
    }
}

impl Default for TimerControl {
    fn default() -> Self {
        TimerControl {
            input_select: C256,
            timer_enabled: false,
        }
    }
}

impl From<u8> for TimerControl {
    fn from(val: u8) -> Self {
        TimerControl {
            timer_enabled: val & 0b0000_0100 > 0,
            input_select: InputClock::from(val),
        }
    }
}

impl From<u8> for InputClock {
    fn from(val: u8) -> Self {
        match val & 0x3 {
            0x0 => InputClock::C1024,
            0x1 => InputClock::C16,
            0x2 => InputClock::C64,
            _ => InputClock::C256,
        }
    }
}

impl InputClock {
    /// The divider bit observed by the TIMA edge detector (bits 3/5/7/9 of the
    /// internal clock for the 262144/65536/16384/4096 Hz rates).
    pub fn to_relevant_bit(&self) -> u16 {
        match self {
            InputClock::C16 => 0x0008,
            InputClock::C64 => 0x0020,
            InputClock::C256 => 0x0080,
            InputClock::C1024 => 0x0200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn enabled_timer() -> TimerRegisters {
        let mut timers = TimerRegisters::default();
        // Enabled, 16 T-cycle period (divider bit 3).
        timers.set_timer_control(0x05);
        timers
    }

    #[test]
    fn test_divider_register_upper_bits() {
        let mut timers = TimerRegisters::default();

        for _ in 0..64 {
            timers.tick_timers();
        }

        assert_eq!(timers.system_clock, 256);
        assert_eq!(timers.divider_register(), 1);
    }

    #[test]
    fn test_tima_increments_on_falling_edge() {
        let mut timers = enabled_timer();

        // Bit 3 falls every 16 T-cycles, so every 4 M-cycles.
        for _ in 0..4 {
            timers.tick_timers();
        }

        assert_eq!(timers.timer_counter, 1);

        for _ in 0..8 {
            timers.tick_timers();
        }

        assert_eq!(timers.timer_counter, 3);
    }

    #[test]
    fn test_overflow_reload_is_delayed() {
        let mut timers = enabled_timer();
        timers.timer_counter = 0xFF;
        timers.timer_modulo = 0x42;

        // Run up to the falling edge that overflows TIMA.
        for _ in 0..4 {
            assert_eq!(timers.tick_timers(), None);
        }

        // During the delay cycle TIMA reads zero and no interrupt is raised yet.
        assert_eq!(timers.timer_counter, 0);

        // The next M-cycle reloads from TMA and requests the interrupt.
        assert_eq!(timers.tick_timers(), Some(InterruptFlags::TIMER));
        assert_eq!(timers.timer_counter, 0x42);
    }

    #[test]
    fn test_tima_write_cancels_pending_overflow() {
        let mut timers = enabled_timer();
        timers.timer_counter = 0xFF;
        timers.timer_modulo = 0x42;

        for _ in 0..4 {
            timers.tick_timers();
        }

        // Writing TIMA during the delay cycle cancels the reload and interrupt.
        timers.set_timer_counter(0x10);

        assert_eq!(timers.tick_timers(), None);
        assert_eq!(timers.timer_counter, 0x10);
    }

    #[test]
    fn test_tma_write_during_reload_updates_tima() {
        let mut timers = enabled_timer();
        timers.timer_counter = 0xFF;
        timers.timer_modulo = 0x42;

        for _ in 0..4 {
            timers.tick_timers();
        }
        assert_eq!(timers.tick_timers(), Some(InterruptFlags::TIMER));

        // We're now in the reload cycle; a TMA write propagates to TIMA.
        timers.set_tma(0x99);

        assert_eq!(timers.timer_counter, 0x99);
        assert_eq!(timers.timer_modulo, 0x99);
    }

    #[test]
    fn test_divider_reset_spurious_increment() {
        let mut timers = enabled_timer();

        // Advance until the observed bit (bit 3) is high.
        for _ in 0..2 {
            timers.tick_timers();
        }
        assert_eq!(timers.timer_counter, 0);

        timers.set_divider();

        assert_eq!(timers.system_clock, 0);
        assert_eq!(timers.timer_counter, 1);
    }

    #[test]
    fn test_sequencer_pulse_every_8192_cycles() {
        let mut timers = TimerRegisters::default();
        let mut pulses = 0;

        // Two full 512Hz periods.
        for _ in 0..4096 {
            timers.tick_timers();
            if timers.take_sequencer_pulse() {
                pulses += 1;
            }
        }

        assert_eq!(pulses, 2);
    }
}
