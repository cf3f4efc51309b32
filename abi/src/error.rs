//! Error types for the VC6 driver core

use core::ffi::c_int;

/// Implement common methods for driver error enums.
///
/// Generates `as_c_int()`, `from_c_int()`, `is_success()`, and `is_error()`
/// methods for `#[repr(i32)]` error enums that follow the kernel's error
/// convention.
macro_rules! impl_driver_error {
    ($ty:ty, fallback: $fallback:ident, variants: { $($val:literal => $variant:ident),* $(,)? }) => {
        impl $ty {
            /// Convert to C-style integer for ioctl-style returns.
            #[inline]
            pub fn as_c_int(self) -> c_int {
                self as c_int
            }

            /// Convert from C-style integer.
            #[inline]
            pub fn from_c_int(val: c_int) -> Self {
                match val {
                    $($val => Self::$variant,)*
                    _ => Self::$fallback,
                }
            }

            /// Check if this is a success result.
            #[inline]
            pub fn is_success(self) -> bool {
                matches!(self, Self::Success)
            }

            /// Check if this is an error result.
            #[inline]
            pub fn is_error(self) -> bool {
                !self.is_success()
            }
        }
    };
}

/// Driver operation result type
pub type VcapResult<T> = Result<T, VcapError>;

/// Errors returned by the capture core.
///
/// Bring-up failures (`Unavailable`, `HwFault`) are fatal to the probe and
/// trigger rollback; everything else is returned to the immediate caller and
/// never takes the device down.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VcapError {
    /// Operation succeeded
    #[default]
    Success = 0,
    /// Register window or another platform resource is missing
    Unavailable = -1,
    /// Out-of-range channel index or wrong-size buffer
    InvalidArgument = -2,
    /// Capture reader slot already owned; retry later
    Busy = -3,
    /// DMA transfer completed with a non-zero error code
    DmaFault = -4,
    /// DMA transfer (or page flip) never completed within the timeout
    DmaStall = -5,
    /// A subsystem's readiness check failed during bring-up
    HwFault = -6,
}

impl_driver_error!(VcapError, fallback: InvalidArgument, variants: {
    0 => Success,
    -1 => Unavailable,
    -2 => InvalidArgument,
    -3 => Busy,
    -4 => DmaFault,
    -5 => DmaStall,
    -6 => HwFault,
});
