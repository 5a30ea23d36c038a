//! Typed access to the `dm.dmsoft` automation object.
//!
//! Every method the object exposes is declared once, in a C-style line kept
//! next to the trait that wraps it. The declarations build the
//! [`MethodTable`] the dispatcher validates against. The typed methods live
//! on capability traits ([`System`], [`PicColor`], [`TextOcr`], ...) that
//! are implemented for anything that can [`Invoke`].

#[macro_use]
mod macros;

pub mod args;
mod composite;
pub mod convention;
pub mod invoke;
#[cfg(feature = "keymap")]
pub mod keymap;
pub mod results;
pub mod wait;

pub mod faq;
pub mod file_ini;
pub mod foobar;
pub mod keyboard_mouse;
pub mod memory;
pub mod pic_color;
pub mod system;
pub mod text_ocr;
pub mod window;

use std::sync::Arc;

use once_cell::sync::Lazy;

pub use dmsoft_bridge::{
    ArgList, AutomationObject, Error, ForeignError, InvocationResult, LifecycleError,
    MarshalError, RawHandle, Result,
};
#[cfg(windows)]
pub use dmsoft_bridge::ComObject;
pub use dmsoft_config::{BridgeConfig, Int64Encoding};
pub use dmsoft_symbol::{MethodTable, TableError};

pub use args::{
    CaptureHandle, Found, Hwnd, Point, Rect, RemoteAddr, ScreenBitmap, ScreenDataHandle, Size,
};
pub use convention::Convention;
pub use invoke::{Dmsoft, Invoke};
pub use wait::{WaitExt, WaitOutcome, poll_until};

pub use faq::Faq;
pub use file_ini::FileIni;
pub use foobar::Foobar;
pub use keyboard_mouse::KeyboardMouse;
pub use memory::Memory;
pub use pic_color::PicColor;
pub use system::System;
pub use text_ocr::TextOcr;
pub use window::Window;

/// Every capability's declarations, in registration order.
pub const CAPABILITIES: [(&str, &str); 9] = [
    (system::CAPABILITY, system::DECLARATIONS),
    (text_ocr::CAPABILITY, text_ocr::DECLARATIONS),
    (pic_color::CAPABILITY, pic_color::DECLARATIONS),
    (keyboard_mouse::CAPABILITY, keyboard_mouse::DECLARATIONS),
    (window::CAPABILITY, window::DECLARATIONS),
    (memory::CAPABILITY, memory::DECLARATIONS),
    (foobar::CAPABILITY, foobar::DECLARATIONS),
    (file_ini::CAPABILITY, file_ini::DECLARATIONS),
    (faq::CAPABILITY, faq::DECLARATIONS),
];

static METHOD_TABLE: Lazy<std::result::Result<Arc<MethodTable>, TableError>> = Lazy::new(|| {
    let table = MethodTable::from_declarations(CAPABILITIES)?;
    tracing::debug!(methods = table.len(), "built method table");
    Ok(Arc::new(table))
});

/// The shared table built from [`CAPABILITIES`].
pub fn method_table() -> Result<Arc<MethodTable>> {
    METHOD_TABLE.as_ref().map(Arc::clone).map_err(|err| Error::from(err.clone()))
}
