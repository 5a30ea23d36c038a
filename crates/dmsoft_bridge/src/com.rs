//! COM backend: the automation object reached through `IDispatch`.

use std::mem::ManuallyDrop;
use std::ptr;

use dmsoft_config::BridgeConfig;
use tracing::debug;
use windows::Win32::Foundation::{DISP_E_EXCEPTION, DISP_E_UNKNOWNNAME, RPC_E_CHANGED_MODE};
use windows::Win32::Globalization::GetSystemDefaultLCID;
use windows::Win32::System::Com::{
    CLSCTX_ALL, CLSIDFromProgID, COINIT_APARTMENTTHREADED, CoCreateInstance, CoInitializeEx,
    CoUninitialize, DISPATCH_METHOD, DISPPARAMS, EXCEPINFO, IDispatch,
};
use windows::Win32::System::Variant::{
    VARENUM, VARIANT, VT_BOOL, VT_BSTR, VT_BYREF, VT_EMPTY, VT_I2, VT_I4, VT_I8, VT_NULL, VT_R4,
    VT_R8, VT_VARIANT, VariantClear,
};
use windows::core::{BSTR, GUID, HSTRING, PCWSTR};

use crate::error::ForeignError;
use crate::object::{AutomationObject, DispId, codes};
use crate::variant::{Variant, WideText, WireArg};

fn windows_error(err: &windows::core::Error, context: &str) -> ForeignError {
    ForeignError::new(err.code().0, format!("{context}: {err}"))
}

/// The object instantiated from its ProgID on the calling thread's
/// apartment.
pub struct ComObject {
    dispatch: Option<IDispatch>,
    uninitialize: bool,
}

impl ComObject {
    /// Initialise COM for this thread and instantiate `config.prog_id`.
    ///
    /// Usable directly as the connector of
    /// [`AutomationHandle::acquire`](crate::AutomationHandle::acquire).
    pub fn connect(config: &BridgeConfig) -> Result<Self, ForeignError> {
        unsafe {
            let hr = CoInitializeEx(None, COINIT_APARTMENTTHREADED);
            if hr.is_err() && hr != RPC_E_CHANGED_MODE {
                return Err(windows_error(&hr.into(), "CoInitializeEx"));
            }
            // RPC_E_CHANGED_MODE means someone else owns the apartment.
            let uninitialize = hr.is_ok();

            let prog_id = HSTRING::from(config.prog_id.as_str());
            let created = CLSIDFromProgID(&prog_id)
                .map_err(|e| windows_error(&e, "CLSIDFromProgID"))
                .and_then(|clsid| {
                    CoCreateInstance::<_, IDispatch>(&clsid, None, CLSCTX_ALL)
                        .map_err(|e| windows_error(&e, "CoCreateInstance"))
                });

            match created {
                Ok(dispatch) => {
                    debug!(prog_id = %config.prog_id, "COM object created");
                    Ok(Self {
                        dispatch: Some(dispatch),
                        uninitialize,
                    })
                }
                Err(err) => {
                    if uninitialize {
                        CoUninitialize();
                    }
                    Err(err)
                }
            }
        }
    }

    fn dispatch(&self) -> Result<&IDispatch, ForeignError> {
        self.dispatch
            .as_ref()
            .ok_or_else(|| ForeignError::new(codes::E_UNEXPECTED, "COM object already released"))
    }
}

impl Drop for ComObject {
    fn drop(&mut self) {
        drop(self.dispatch.take());
        if self.uninitialize {
            unsafe { CoUninitialize() };
        }
    }
}

impl AutomationObject for ComObject {
    fn lookup(&self, name: &str) -> Result<Option<DispId>, ForeignError> {
        let dispatch = self.dispatch()?;
        let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
        let names = [PCWSTR(wide.as_ptr())];
        let mut id = 0i32;
        let outcome = unsafe {
            dispatch.GetIDsOfNames(
                &GUID::zeroed(),
                names.as_ptr(),
                1,
                GetSystemDefaultLCID(),
                &mut id,
            )
        };
        match outcome {
            Ok(()) => Ok(Some(id)),
            Err(err) if err.code() == DISP_E_UNKNOWNNAME => Ok(None),
            Err(err) => Err(windows_error(&err, "GetIDsOfNames")),
        }
    }

    fn invoke(&self, id: DispId, args: &mut [WireArg]) -> Result<Variant, ForeignError> {
        let dispatch = self.dispatch()?;
        let mut frame = Frame::build(args)?;

        let params = DISPPARAMS {
            rgvarg: if frame.values.is_empty() {
                ptr::null_mut()
            } else {
                frame.values.as_mut_ptr()
            },
            rgdispidNamedArgs: ptr::null_mut(),
            cArgs: frame.values.len() as u32,
            cNamedArgs: 0,
        };
        let mut result = OwnedVariant(VARIANT::default());
        let mut except = EXCEPINFO::default();
        let outcome = unsafe {
            dispatch.Invoke(
                id,
                &GUID::zeroed(),
                GetSystemDefaultLCID(),
                DISPATCH_METHOD,
                &params,
                Some(&mut result.0),
                Some(&mut except),
                None,
            )
        };
        if let Err(err) = outcome {
            return Err(invoke_error(&err, &except));
        }

        let mut slots = frame.slots.iter();
        for arg in args.iter_mut().filter(|arg| arg.is_by_ref()) {
            if let Some(slot) = slots.next() {
                arg.set(from_variant(slot)?)?;
            }
        }
        from_variant(&result.0)
    }
}

fn invoke_error(err: &windows::core::Error, except: &EXCEPINFO) -> ForeignError {
    if err.code() == DISP_E_EXCEPTION {
        let code = if except.scode != 0 {
            except.scode
        } else {
            codes::DISP_E_EXCEPTION
        };
        let message = if except.bstrDescription.is_empty() {
            String::from("exception raised by the automation object")
        } else {
            except.bstrDescription.to_string()
        };
        ForeignError::new(code, message)
    } else {
        windows_error(err, "Invoke")
    }
}

/// Cleared on drop so BSTRs created for or returned by a call are freed.
struct OwnedVariant(VARIANT);

impl Drop for OwnedVariant {
    fn drop(&mut self) {
        unsafe {
            let _ = VariantClear(&mut self.0);
        }
    }
}

/// Argument storage for one `Invoke`. By-reference arguments point into
/// `slots`, which is filled completely before any pointer is taken.
struct Frame {
    values: Vec<VARIANT>,
    slots: Vec<OwnedVariant>,
}

impl Frame {
    fn build(args: &[WireArg]) -> Result<Self, ForeignError> {
        let mut slots = args
            .iter()
            .filter(|arg| arg.is_by_ref())
            .map(|arg| to_variant(arg.value()).map(OwnedVariant))
            .collect::<Result<Vec<_>, _>>()?;

        let mut values = Vec::with_capacity(args.len());
        let mut next_slot = slots.iter_mut();
        for arg in args {
            let value = match arg {
                WireArg::Value(value) => to_variant(value)?,
                WireArg::ByRef(_) => match next_slot.next() {
                    Some(slot) => by_ref(&mut slot.0),
                    None => VARIANT::default(),
                },
            };
            values.push(value);
        }

        Ok(Self { values, slots })
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        for value in &mut self.values {
            unsafe {
                let _ = VariantClear(value);
            }
        }
    }
}

fn set_vt(v: &mut VARIANT, vt: VARENUM) {
    unsafe {
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.vt, vt);
    }
}

fn by_ref(target: *mut VARIANT) -> VARIANT {
    let mut v = VARIANT::default();
    set_vt(&mut v, VARENUM(VT_BYREF.0 | VT_VARIANT.0));
    unsafe {
        let inner = &mut *v.Anonymous.Anonymous;
        ptr::write(&mut inner.Anonymous.pvarVal, target);
    }
    v
}

fn to_variant(value: &Variant) -> Result<VARIANT, ForeignError> {
    let mut v = VARIANT::default();
    unsafe {
        let inner = &mut *v.Anonymous.Anonymous;
        match value {
            Variant::Empty => ptr::write(&mut inner.vt, VT_EMPTY),
            Variant::I4(n) => {
                ptr::write(&mut inner.vt, VT_I4);
                ptr::write(&mut inner.Anonymous.lVal, *n);
            }
            Variant::I8(n) => {
                ptr::write(&mut inner.vt, VT_I8);
                ptr::write(&mut inner.Anonymous.llVal, *n);
            }
            Variant::R4(n) => {
                ptr::write(&mut inner.vt, VT_R4);
                ptr::write(&mut inner.Anonymous.fltVal, *n);
            }
            Variant::R8(n) => {
                ptr::write(&mut inner.vt, VT_R8);
                ptr::write(&mut inner.Anonymous.dblVal, *n);
            }
            Variant::Text(text) => {
                let bstr = BSTR::from_wide(text.as_units())
                    .map_err(|e| windows_error(&e, "SysAllocString"))?;
                ptr::write(&mut inner.vt, VT_BSTR);
                ptr::write(&mut inner.Anonymous.bstrVal, ManuallyDrop::new(bstr));
            }
        }
    }
    Ok(v)
}

fn from_variant(v: &VARIANT) -> Result<Variant, ForeignError> {
    unsafe {
        let inner = &v.Anonymous.Anonymous;
        let vt = inner.vt;
        let value = if vt == VT_EMPTY || vt == VT_NULL {
            Variant::Empty
        } else if vt == VT_I4 {
            Variant::I4(inner.Anonymous.lVal)
        } else if vt == VT_I2 {
            Variant::I4(i32::from(inner.Anonymous.iVal))
        } else if vt == VT_BOOL {
            Variant::I4(i32::from(inner.Anonymous.boolVal.0 != 0))
        } else if vt == VT_I8 {
            Variant::I8(inner.Anonymous.llVal)
        } else if vt == VT_R4 {
            Variant::R4(inner.Anonymous.fltVal)
        } else if vt == VT_R8 {
            Variant::R8(inner.Anonymous.dblVal)
        } else if vt == VT_BSTR {
            Variant::Text(WideText::from_units(inner.Anonymous.bstrVal.as_wide().to_vec()))
        } else {
            return Err(ForeignError::new(
                codes::DISP_E_TYPEMISMATCH,
                format!("unsupported variant type {}", vt.0),
            ));
        };
        Ok(value)
    }
}
