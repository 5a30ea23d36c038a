//! Generic wire values exchanged with the automation object.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ForeignError;
use crate::object::codes;

/// Counts text buffers created for a call that are still alive.
///
/// Every [`WideText`] minted through a ledger increments it and decrements
/// it on drop, so a settled dispatcher reports zero.
#[derive(Debug, Clone, Default)]
pub struct BufferLedger(Arc<AtomicUsize>);

impl BufferLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    fn acquire(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    fn release(&self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// UTF-16 text buffer, the representation the object's strings use.
pub struct WideText {
    units: Vec<u16>,
    ledger: Option<BufferLedger>,
}

impl WideText {
    pub fn new(text: &str) -> Self {
        Self {
            units: text.encode_utf16().collect(),
            ledger: None,
        }
    }

    pub fn tracked(text: &str, ledger: &BufferLedger) -> Self {
        ledger.acquire();
        Self {
            units: text.encode_utf16().collect(),
            ledger: Some(ledger.clone()),
        }
    }

    pub fn from_units(units: Vec<u16>) -> Self {
        Self {
            units,
            ledger: None,
        }
    }

    pub fn as_units(&self) -> &[u16] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Unpaired surrogates become U+FFFD.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }
}

impl Clone for WideText {
    fn clone(&self) -> Self {
        if let Some(ledger) = &self.ledger {
            ledger.acquire();
        }
        Self {
            units: self.units.clone(),
            ledger: self.ledger.clone(),
        }
    }
}

impl Drop for WideText {
    fn drop(&mut self) {
        if let Some(ledger) = self.ledger.take() {
            ledger.release();
        }
    }
}

impl PartialEq for WideText {
    fn eq(&self, other: &Self) -> bool {
        self.units == other.units
    }
}

impl fmt::Debug for WideText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

impl fmt::Display for WideText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    #[default]
    Empty,
    I4(i32),
    I8(i64),
    R4(f32),
    R8(f64),
    Text(WideText),
}

impl Variant {
    pub fn text(text: &str) -> Self {
        Variant::Text(WideText::new(text))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Variant::Empty => "empty",
            Variant::I4(_) => "i4",
            Variant::I8(_) => "i8",
            Variant::R4(_) => "r4",
            Variant::R8(_) => "r8",
            Variant::Text(_) => "text",
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Variant::I4(v) => Some(*v),
            Variant::I8(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Variant::I4(v) => Some(i64::from(*v)),
            Variant::I8(v) => Some(*v),
            Variant::Text(t) => t.to_string_lossy().trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Variant::R4(v) => Some(f64::from(*v)),
            Variant::R8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn to_text(&self) -> Option<String> {
        match self {
            Variant::Text(t) => Some(t.to_string_lossy()),
            _ => None,
        }
    }
}

impl From<i32> for Variant {
    fn from(value: i32) -> Self {
        Variant::I4(value)
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Variant::I8(value)
    }
}

impl From<f32> for Variant {
    fn from(value: f32) -> Self {
        Variant::R4(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Variant::R8(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::text(value)
    }
}

/// Storage for one by-reference argument. Each slot owns its value, so two
/// out-parameters of the same call never alias.
#[derive(Debug, Clone, PartialEq)]
pub struct RefSlot {
    value: Variant,
}

impl RefSlot {
    pub fn new(initial: Variant) -> Self {
        Self { value: initial }
    }

    pub fn get(&self) -> &Variant {
        &self.value
    }

    pub fn set(&mut self, value: Variant) {
        self.value = value;
    }

    pub fn into_inner(self) -> Variant {
        self.value
    }
}

/// One argument as presented to the object.
#[derive(Debug, Clone, PartialEq)]
pub enum WireArg {
    Value(Variant),
    ByRef(RefSlot),
}

impl WireArg {
    pub fn value(&self) -> &Variant {
        match self {
            WireArg::Value(v) => v,
            WireArg::ByRef(slot) => slot.get(),
        }
    }

    pub fn is_by_ref(&self) -> bool {
        matches!(self, WireArg::ByRef(_))
    }

    /// Write through a by-reference slot. By-value arguments cannot be
    /// written.
    pub fn set(&mut self, value: Variant) -> Result<(), ForeignError> {
        match self {
            WireArg::ByRef(slot) => {
                slot.set(value);
                Ok(())
            }
            WireArg::Value(_) => Err(ForeignError::new(
                codes::DISP_E_TYPEMISMATCH,
                "argument is not passed by reference",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_tracks_clones_and_drops() {
        let ledger = BufferLedger::new();
        let a = WideText::tracked("abc", &ledger);
        let b = a.clone();
        assert_eq!(ledger.live(), 2);
        drop(a);
        assert_eq!(ledger.live(), 1);
        drop(b);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn test_wide_text_round_trips_non_ascii() {
        let text = WideText::new("大漠 插件 ✓");
        assert_eq!(text.to_string_lossy(), "大漠 插件 ✓");
        assert_eq!(text, WideText::from_units("大漠 插件 ✓".encode_utf16().collect()));
    }

    #[test]
    fn test_by_value_arg_rejects_writes() {
        let mut arg = WireArg::Value(Variant::I4(1));
        assert!(arg.set(Variant::I4(2)).is_err());
        let mut arg = WireArg::ByRef(RefSlot::new(Variant::I4(1)));
        arg.set(Variant::I4(2)).unwrap();
        assert_eq!(arg.value(), &Variant::I4(2));
    }
}
