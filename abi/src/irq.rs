//! Interrupt status/mask register layout.
//!
//! The VC6 reports all subunit events through a single status register and a
//! matching enable register; one bit per source. Dispatch priority is a
//! driver contract (see `vcap-drivers`), not encoded here.

use bitflags::bitflags;

bitflags! {
    /// One bit per interrupt source, shared by the status and enable
    /// registers.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqStatus: u32 {
        /// Host bus reported a transaction error
        const BUS_FAULT   = 1 << 0;
        /// DMA channel 0 transfer complete
        const DMA_0       = 1 << 1;
        /// DMA channel 1 transfer complete
        const DMA_1       = 1 << 2;
        /// DMA channel 2 transfer complete
        const DMA_2       = 1 << 3;
        /// DMA channel 3 transfer complete
        const DMA_3       = 1 << 4;
        /// Control-bus controller state change
        const CONTROL_BUS = 1 << 5;
        /// Video-input front end event
        const VIDEO_IN    = 1 << 6;
        /// Encoder pipeline event
        const ENCODER     = 1 << 7;
        /// Audio pipeline event
        const AUDIO       = 1 << 8;
    }
}

impl IrqStatus {
    /// The completion bit for one DMA channel.
    #[inline]
    pub fn dma_channel(ch: usize) -> IrqStatus {
        IrqStatus::from_bits_truncate(IrqStatus::DMA_0.bits() << ch)
    }

    /// All DMA channel completion bits.
    #[inline]
    pub fn dma_all() -> IrqStatus {
        IrqStatus::DMA_0 | IrqStatus::DMA_1 | IrqStatus::DMA_2 | IrqStatus::DMA_3
    }
}
