//! Conversion between native argument values and wire variants.

use dmsoft_config::Int64Encoding;
use dmsoft_symbol::{Direction, MethodDescriptor, ParamSpec, ValueKind};

use crate::error::MarshalError;
use crate::value::{Arg, ArgList, ArgumentValue, RawHandle};
use crate::variant::{BufferLedger, RefSlot, Variant, WideText, WireArg};

/// Packs and unpacks values for one call site. Text buffers it creates are
/// counted by the ledger and freed when the owning [`PackedCall`] drops.
#[derive(Debug, Clone)]
pub struct Marshaler {
    encoding: Int64Encoding,
    ledger: BufferLedger,
}

impl Marshaler {
    pub fn new(encoding: Int64Encoding, ledger: BufferLedger) -> Self {
        Self { encoding, ledger }
    }

    pub fn ledger(&self) -> &BufferLedger {
        &self.ledger
    }

    /// Convert `value` to the wire kind `spec` declares.
    pub fn pack(
        &self,
        method: &str,
        spec: &ParamSpec,
        value: &ArgumentValue,
    ) -> Result<Variant, MarshalError> {
        let kind_error = || MarshalError::Kind {
            method: method.to_string(),
            param: spec.name.clone(),
            expected: spec.kind,
            found: value.kind(),
        };
        let narrow = |v: i64| {
            i32::try_from(v).map_err(|_| MarshalError::OutOfRange {
                method: method.to_string(),
                param: spec.name.clone(),
                value: v,
                target: ValueKind::Int32,
            })
        };

        match (spec.kind, value) {
            (ValueKind::Int32, ArgumentValue::Int32(v)) => Ok(Variant::I4(*v)),
            (ValueKind::Int32, ArgumentValue::Handle(h)) => narrow(h.0).map(Variant::I4),
            (ValueKind::Int64, ArgumentValue::Int64(v)) => Ok(self.encode_i64(*v)),
            (ValueKind::Int64, ArgumentValue::Handle(h)) => Ok(self.encode_i64(h.0)),
            (ValueKind::Handle, ArgumentValue::Handle(h)) => Ok(handle_variant(*h)),
            (ValueKind::Handle, ArgumentValue::Int32(v)) => Ok(Variant::I4(*v)),
            (ValueKind::Float32, ArgumentValue::Float32(v)) => Ok(Variant::R4(*v)),
            (ValueKind::Float64, ArgumentValue::Float64(v)) => Ok(Variant::R8(*v)),
            (ValueKind::Text, ArgumentValue::Text(s)) => Ok(self.text(s)),
            _ => Err(kind_error()),
        }
    }

    /// Wire form for a call the method table has no descriptor for.
    pub fn pack_natural(&self, value: &ArgumentValue) -> Variant {
        match value {
            ArgumentValue::Int32(v) => Variant::I4(*v),
            ArgumentValue::Int64(v) => self.encode_i64(*v),
            ArgumentValue::Float32(v) => Variant::R4(*v),
            ArgumentValue::Float64(v) => Variant::R8(*v),
            ArgumentValue::Text(s) => self.text(s),
            ArgumentValue::Handle(h) => handle_variant(*h),
        }
    }

    /// Convert a returned or written-back variant to the declared kind.
    pub fn unpack(
        &self,
        method: &str,
        kind: ValueKind,
        variant: &Variant,
    ) -> Result<ArgumentValue, MarshalError> {
        let unexpected = || MarshalError::UnexpectedVariant {
            method: method.to_string(),
            expected: kind,
            found: variant.type_name(),
        };

        match (kind, variant) {
            (ValueKind::Int32, Variant::I4(v)) => Ok(ArgumentValue::Int32(*v)),
            (ValueKind::Int32, Variant::I8(v)) => i32::try_from(*v)
                .map(ArgumentValue::Int32)
                .map_err(|_| unexpected()),
            (ValueKind::Int64, Variant::I8(v)) => Ok(ArgumentValue::Int64(*v)),
            (ValueKind::Int64, Variant::I4(v)) => Ok(ArgumentValue::Int64(i64::from(*v))),
            (ValueKind::Int64, Variant::Text(t)) => {
                let text = t.to_string_lossy();
                text.trim()
                    .parse()
                    .map(ArgumentValue::Int64)
                    .map_err(|_| MarshalError::Int64Text {
                        method: method.to_string(),
                        text,
                    })
            }
            (ValueKind::Handle, Variant::I4(v)) => {
                Ok(ArgumentValue::Handle(RawHandle(i64::from(*v))))
            }
            (ValueKind::Handle, Variant::I8(v)) => Ok(ArgumentValue::Handle(RawHandle(*v))),
            (ValueKind::Float32, Variant::R4(v)) => Ok(ArgumentValue::Float32(*v)),
            // Some builds widen single-precision results on the way out.
            (ValueKind::Float32, Variant::R8(v)) => Ok(ArgumentValue::Float32(*v as f32)),
            (ValueKind::Float64, Variant::R8(v)) => Ok(ArgumentValue::Float64(*v)),
            (ValueKind::Float64, Variant::R4(v)) => Ok(ArgumentValue::Float64(f64::from(*v))),
            (ValueKind::Text, Variant::Text(t)) => Ok(ArgumentValue::Text(t.to_string_lossy())),
            // A null string comes back as an empty variant.
            (ValueKind::Text, Variant::Empty) => Ok(ArgumentValue::Text(String::new())),
            _ => Err(unexpected()),
        }
    }

    pub fn unpack_natural(&self, variant: &Variant) -> Option<ArgumentValue> {
        match variant {
            Variant::Empty => None,
            Variant::I4(v) => Some(ArgumentValue::Int32(*v)),
            Variant::I8(v) => Some(ArgumentValue::Int64(*v)),
            Variant::R4(v) => Some(ArgumentValue::Float32(*v)),
            Variant::R8(v) => Some(ArgumentValue::Float64(*v)),
            Variant::Text(t) => Some(ArgumentValue::Text(t.to_string_lossy())),
        }
    }

    /// Validate `args` against `descriptor` and lay them out for the object.
    ///
    /// Nothing reaches the object when validation fails.
    pub fn pack_call(
        &self,
        descriptor: &MethodDescriptor,
        args: &ArgList,
    ) -> Result<PackedCall, MarshalError> {
        let method = descriptor.name.as_str();
        if args.len() != descriptor.arity() {
            return Err(MarshalError::Arity {
                method: method.to_string(),
                expected: descriptor.arity(),
                found: args.len(),
            });
        }

        let mut natural = Vec::with_capacity(args.len());
        let mut by_ref = Vec::new();
        for (position, (spec, arg)) in descriptor.params.iter().zip(args).enumerate() {
            if spec.direction != arg.direction() {
                return Err(MarshalError::Direction {
                    method: method.to_string(),
                    param: spec.name.clone(),
                    expected: spec.direction,
                    found: arg.direction(),
                });
            }
            let wire = match arg {
                Arg::In(value) => WireArg::Value(self.pack(method, spec, value)?),
                Arg::InOut(value) => WireArg::ByRef(RefSlot::new(self.pack(method, spec, value)?)),
                Arg::Out(kind) => {
                    if !kinds_compatible(spec.kind, *kind) {
                        return Err(MarshalError::Kind {
                            method: method.to_string(),
                            param: spec.name.clone(),
                            expected: spec.kind,
                            found: *kind,
                        });
                    }
                    WireArg::ByRef(RefSlot::new(self.zero(spec.kind)))
                }
            };
            if spec.direction.is_by_ref() {
                by_ref.push((position, spec.kind));
            }
            natural.push(wire);
        }

        Ok(PackedCall::from_natural(natural, by_ref))
    }

    /// Lay out arguments for a method with no descriptor, trusting the
    /// caller's kinds and directions.
    pub fn pack_undeclared(&self, args: &ArgList) -> PackedCall {
        let mut natural = Vec::with_capacity(args.len());
        let mut by_ref = Vec::new();
        for (position, arg) in args.iter().enumerate() {
            let wire = match arg {
                Arg::In(value) => WireArg::Value(self.pack_natural(value)),
                Arg::InOut(value) => WireArg::ByRef(RefSlot::new(self.pack_natural(value))),
                Arg::Out(kind) => WireArg::ByRef(RefSlot::new(self.zero(*kind))),
            };
            if arg.direction().is_by_ref() {
                by_ref.push((position, arg.kind()));
            }
            natural.push(wire);
        }
        PackedCall::from_natural(natural, by_ref)
    }

    fn encode_i64(&self, value: i64) -> Variant {
        match self.encoding {
            Int64Encoding::Native => Variant::I8(value),
            Int64Encoding::DecimalText => self.text(&value.to_string()),
        }
    }

    fn text(&self, text: &str) -> Variant {
        Variant::Text(WideText::tracked(text, &self.ledger))
    }

    fn zero(&self, kind: ValueKind) -> Variant {
        match kind {
            ValueKind::Int32 | ValueKind::Handle => Variant::I4(0),
            ValueKind::Int64 => self.encode_i64(0),
            ValueKind::Float32 => Variant::R4(0.0),
            ValueKind::Float64 => Variant::R8(0.0),
            ValueKind::Text => self.text(""),
        }
    }
}

fn handle_variant(handle: RawHandle) -> Variant {
    match i32::try_from(handle.0) {
        Ok(v) => Variant::I4(v),
        Err(_) => Variant::I8(handle.0),
    }
}

fn kinds_compatible(declared: ValueKind, supplied: ValueKind) -> bool {
    declared == supplied
        || matches!(
            (declared, supplied),
            (ValueKind::Int32, ValueKind::Handle)
                | (ValueKind::Handle, ValueKind::Int32)
                | (ValueKind::Int64, ValueKind::Handle)
        )
}

/// Arguments of one call, laid out in presentation order.
///
/// Owns every buffer created for the call; dropping it releases them on
/// success and failure alike.
#[derive(Debug)]
pub struct PackedCall {
    presented: Vec<WireArg>,
    /// Natural position and declared kind of every by-reference slot.
    by_ref: Vec<(usize, ValueKind)>,
}

impl PackedCall {
    fn from_natural(mut natural: Vec<WireArg>, by_ref: Vec<(usize, ValueKind)>) -> Self {
        natural.reverse();
        Self {
            presented: natural,
            by_ref,
        }
    }

    pub fn len(&self) -> usize {
        self.presented.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presented.is_empty()
    }

    pub fn presented(&self) -> &[WireArg] {
        &self.presented
    }

    pub fn presented_mut(&mut self) -> &mut [WireArg] {
        &mut self.presented
    }

    /// The argument at natural position `position`.
    pub fn natural(&self, position: usize) -> Option<&WireArg> {
        let idx = self.presented.len().checked_sub(position + 1)?;
        self.presented.get(idx)
    }

    /// Final values of the by-reference slots, in natural order.
    pub fn read_back(
        &self,
        marshaler: &Marshaler,
        method: &str,
    ) -> Result<Vec<ArgumentValue>, MarshalError> {
        self.by_ref
            .iter()
            .map(|&(position, kind)| {
                let wire = self
                    .natural(position)
                    .ok_or_else(|| MarshalError::MissingValue {
                        method: method.to_string(),
                        wanted: format!("out-parameter {position}"),
                    })?;
                marshaler.unpack(method, kind, wire.value())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmsoft_symbol::parse_declarations;

    fn marshaler(encoding: Int64Encoding) -> Marshaler {
        Marshaler::new(encoding, BufferLedger::new())
    }

    fn descriptor(line: &str) -> MethodDescriptor {
        parse_declarations("test", line)
            .unwrap()
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn test_arguments_are_presented_in_reverse() {
        let m = marshaler(Int64Encoding::Native);
        let desc = descriptor("long MoveTo(long x, long y);");
        let packed = m.pack_call(&desc, &ArgList::from_args((10, 20))).unwrap();
        let wire: Vec<_> = packed.presented().iter().map(WireArg::value).collect();
        assert_eq!(wire, vec![&Variant::I4(20), &Variant::I4(10)]);
        assert_eq!(packed.natural(0).map(WireArg::value), Some(&Variant::I4(10)));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let m = marshaler(Int64Encoding::Native);
        let desc = descriptor("long MoveTo(long x, long y);");
        let err = m
            .pack_call(&desc, &ArgList::from_args((10, "20")))
            .unwrap_err();
        assert!(matches!(
            err,
            MarshalError::Kind { ref param, expected: ValueKind::Int32, found: ValueKind::Text, .. }
                if param == "y"
        ));
    }

    #[test]
    fn test_arity_and_direction_are_checked() {
        let m = marshaler(Int64Encoding::Native);
        let desc = descriptor("long GetCursorPos(long * x, long * y);");
        assert!(matches!(
            m.pack_call(&desc, &ArgList::new().out(ValueKind::Int32)),
            Err(MarshalError::Arity { expected: 2, found: 1, .. })
        ));
        assert!(matches!(
            m.pack_call(&desc, &ArgList::from_args((1, 2))),
            Err(MarshalError::Direction { expected: Direction::Out, found: Direction::In, .. })
        ));
    }

    #[test]
    fn test_int64_encodings() {
        let desc = descriptor("long WriteIntAddr(long hwnd, LONGLONG addr, long type, LONGLONG v);");
        let args = ArgList::from_args((1, 0x1_0000_0000_i64, 3, -5_i64));

        let native = marshaler(Int64Encoding::Native).pack_call(&desc, &args).unwrap();
        assert_eq!(native.natural(1).map(WireArg::value), Some(&Variant::I8(0x1_0000_0000)));

        let text = marshaler(Int64Encoding::DecimalText)
            .pack_call(&desc, &args)
            .unwrap();
        assert_eq!(
            text.natural(1).and_then(|w| w.value().to_text()),
            Some("4294967296".to_string())
        );
        assert_eq!(
            text.natural(3).and_then(|w| w.value().to_text()),
            Some("-5".to_string())
        );
    }

    #[test]
    fn test_handle_range_check() {
        let m = marshaler(Int64Encoding::Native);
        let desc = descriptor("long GetWindowState(long hwnd, long flag);");
        let args = ArgList::from_args((RawHandle(i64::from(i32::MAX) + 1), 1));
        assert!(matches!(
            m.pack_call(&desc, &args),
            Err(MarshalError::OutOfRange { target: ValueKind::Int32, .. })
        ));
        assert!(m.pack_call(&desc, &ArgList::from_args((RawHandle(0x5080A), 1))).is_ok());
    }

    #[test]
    fn test_buffers_released_with_packed_call() {
        let m = marshaler(Int64Encoding::Native);
        let desc = descriptor("long SetPath(const TCHAR * path);");
        let packed = m.pack_call(&desc, &ArgList::from_args("c:\\pics")).unwrap();
        assert_eq!(m.ledger().live(), 1);
        drop(packed);
        assert_eq!(m.ledger().live(), 0);
    }

    #[test]
    fn test_read_back_in_natural_order() {
        let m = marshaler(Int64Encoding::Native);
        let desc = descriptor("long ClientToScreen(long hwnd, [in,out] long * x, [in,out] long * y);");
        let args = ArgList::new().arg(7).in_out(3).in_out(4);
        let mut packed = m.pack_call(&desc, &args).unwrap();
        // presentation order is (y, x, hwnd)
        packed.presented_mut()[0].set(Variant::I4(104)).unwrap();
        packed.presented_mut()[1].set(Variant::I4(103)).unwrap();
        let outs = packed.read_back(&m, "ClientToScreen").unwrap();
        assert_eq!(outs, vec![ArgumentValue::Int32(103), ArgumentValue::Int32(104)]);
    }

    #[test]
    fn test_unpack_text_and_empty() {
        let m = marshaler(Int64Encoding::Native);
        assert_eq!(
            m.unpack("Ver", ValueKind::Text, &Variant::text("3.1233")),
            Ok(ArgumentValue::Text("3.1233".into()))
        );
        assert_eq!(
            m.unpack("Ver", ValueKind::Text, &Variant::Empty),
            Ok(ArgumentValue::Text(String::new()))
        );
        assert!(m.unpack("Ver", ValueKind::Int32, &Variant::text("x")).is_err());
        assert_eq!(
            m.unpack("ReadInt", ValueKind::Int64, &Variant::text("-42")),
            Ok(ArgumentValue::Int64(-42))
        );
    }
}
