use bitflags::*;

/// The flag used to signal that an interrupt is pending.
pub const INTERRUPTS_FLAG: u16 = 0xFF0F;
/// Interrupts Enable Register (IE)
pub const INTERRUPTS_ENABLE: u16 = 0xFFFF;

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub enum Interrupt {
    VBLANK = 0b0000_0001,
    LcdStat = 0b0000_0010,
    TIMER = 0b0000_0100,
    SERIAL = 0b0000_1000,
    JOYPAD = 0b0001_0000,
}

impl Interrupt {
    /// Iterate all interrupts in dispatch priority order (lowest bit first).
    pub fn iter() -> impl Iterator<Item = Interrupt> {
        use crate::io::interrupts::Interrupt::{LcdStat, JOYPAD, SERIAL, TIMER, VBLANK};
        [VBLANK, LcdStat, TIMER, SERIAL, JOYPAD].iter().copied()
    }

    pub fn vector(self) -> u16 {
        match self {
            Interrupt::VBLANK => 0x0040,
            Interrupt::LcdStat => 0x0048,
            Interrupt::TIMER => 0x0050,
            Interrupt::SERIAL => 0x0058,
            Interrupt::JOYPAD => 0x0060,
        }
    }
}

bitflags! {
    #[derive(Default)]
    pub struct InterruptFlags: u8 {
        /// V-Blank
        const VBLANK = 0b0000_0001;
        /// LCD Stat
        const LCD    = 0b0000_0010;
        /// Timer
        const TIMER  = 0b0000_0100;
        /// Serial
        const SERIAL = 0b0000_1000;
        /// Joypad
        const JOYPAD = 0b0001_0000;
    }
}

/// The IE/IF register pair. IF's upper three bits are not backed by hardware
/// and always read high.
#[derive(Default, Debug, Clone)]
pub struct Interrupts {
    pub interrupt_enable: InterruptFlags,
    pub interrupt_enable_upper: u8,
    pub interrupt_flag: InterruptFlags,
}

impl Interrupts {
    pub fn insert_interrupt(&mut self, interrupt: InterruptFlags) {
        self.interrupt_flag.insert(interrupt);
    }

    pub fn read_ie(&self) -> u8 {
        self.interrupt_enable.bits() | self.interrupt_enable_upper
    }

    pub fn read_if(&self) -> u8 {
        0xE0 | self.interrupt_flag.bits()
    }

    pub fn overwrite_ie(&mut self, value: u8) {
        self.interrupt_enable = InterruptFlags::from_bits_truncate(value);
        // The upper bits of IE are writable even though no interrupt backs them.
        self.interrupt_enable_upper = value & 0xE0;
    }

    pub fn overwrite_if(&mut self, value: u8) {
        self.interrupt_flag = InterruptFlags::from_bits_truncate(value);
    }

    /// Returns `true` if any enabled interrupt is pending.
    pub fn should_check(&self) -> bool {
        !(self.interrupt_flag & self.interrupt_enable).is_empty()
    }

    /// The highest-priority interrupt which is both requested and enabled.
    pub fn next_pending(&self) -> Option<Interrupt> {
        let pending = self.interrupt_flag & self.interrupt_enable;
        if pending.is_empty() {
            return None;
        }
        Interrupt::iter().find(|intr| pending.bits() & (*intr as u8) != 0)
    }

    /// Acknowledge the given interrupt by clearing its IF bit.
    pub fn acknowledge(&mut self, interrupt: Interrupt) {
        self.interrupt_flag
            .remove(InterruptFlags::from_bits_truncate(interrupt as u8));
    }
}

#[cfg(test)]
mod test {
    use super::Interrupt::*;
    use super::*;

    #[test]
    fn test_interrupt_order() {
        let ordered_array = [VBLANK, LcdStat, TIMER, SERIAL, JOYPAD];
        for (i, interrupt) in Interrupt::iter().enumerate() {
            assert_eq!(ordered_array[i], interrupt)
        }
    }

    #[test]
    fn test_priority_selection() {
        let mut interrupts = Interrupts::default();
        interrupts.overwrite_ie(0x1F);
        interrupts.overwrite_if(0b0001_0100);

        assert_eq!(interrupts.next_pending(), Some(TIMER));

        interrupts.acknowledge(TIMER);

        assert_eq!(interrupts.next_pending(), Some(JOYPAD));
    }

    #[test]
    fn test_if_upper_bits_forced() {
        let mut interrupts = Interrupts::default();
        interrupts.overwrite_if(0x00);

        assert_eq!(interrupts.read_if(), 0xE0);

        interrupts.overwrite_if(0xFF);

        assert_eq!(interrupts.read_if(), 0xFF);
    }

    #[test]
    fn test_masked_interrupts_never_pending() {
        let mut interrupts = Interrupts::default();
        interrupts.overwrite_ie(0x00);
        interrupts.overwrite_if(0x1F);

        assert!(!interrupts.should_check());
        assert_eq!(interrupts.next_pending(), None);
    }
}
