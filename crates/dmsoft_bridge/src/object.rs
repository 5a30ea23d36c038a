//! The seam between the dispatcher and a concrete automation object.

use crate::error::ForeignError;
use crate::variant::{Variant, WireArg};

/// Integer identifier the object assigns to a method name.
pub type DispId = i32;

/// Status codes shared by the COM backend and the in-process stub.
pub mod codes {
    pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;
    pub const E_UNEXPECTED: i32 = 0x8000_FFFF_u32 as i32;
    pub const DISP_E_MEMBERNOTFOUND: i32 = 0x8002_0003_u32 as i32;
    pub const DISP_E_TYPEMISMATCH: i32 = 0x8002_0005_u32 as i32;
    pub const DISP_E_UNKNOWNNAME: i32 = 0x8002_0006_u32 as i32;
    pub const DISP_E_EXCEPTION: i32 = 0x8002_0009_u32 as i32;
    pub const DISP_E_BADPARAMCOUNT: i32 = 0x8002_000E_u32 as i32;
    pub const REGDB_E_CLASSNOTREG: i32 = 0x8004_0154_u32 as i32;
}

/// A late-bound object: names are resolved to ids at runtime and calls carry
/// generic wire values.
///
/// `args` arrive in presentation order, the reverse of the declared order.
/// By-reference slots may be written by the object; the dispatcher reads
/// them back once `invoke` returns.
pub trait AutomationObject {
    /// `Ok(None)` when the object does not recognize `name`.
    fn lookup(&self, name: &str) -> Result<Option<DispId>, ForeignError>;

    fn invoke(&self, id: DispId, args: &mut [WireArg]) -> Result<Variant, ForeignError>;
}

impl<T: AutomationObject + ?Sized> AutomationObject for Box<T> {
    fn lookup(&self, name: &str) -> Result<Option<DispId>, ForeignError> {
        (**self).lookup(name)
    }

    fn invoke(&self, id: DispId, args: &mut [WireArg]) -> Result<Variant, ForeignError> {
        (**self).invoke(id, args)
    }
}
