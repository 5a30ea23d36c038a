//! Parser for C-style method declaration lines.
//!
//! ```text
//! long FindColor(long x1,long y1,long x2,long y2,const TCHAR * color,double sim,long dir,long * x,long * y);
//! long ClientToScreen(long hwnd,[in,out] long * x,[in,out] long * y);
//! ```
//!
//! Blank lines and `//` comments are ignored, a leading `virtual` is
//! accepted. A pointer parameter is an out parameter unless it carries an
//! `[in,out]` attribute.

use thiserror::Error;

use crate::descriptor::{MethodDescriptor, ParamSpec};
use crate::kind::{Direction, ValueKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclError {
    #[error("line {line}: expected `<type> <Name>(<params>);`, found `{text}`")]
    Malformed { line: usize, text: String },
    #[error("line {line}: unsupported return type `{ty}`")]
    UnsupportedReturn { line: usize, ty: String },
    #[error("line {line}: unsupported parameter type `{ty}` for `{param}`")]
    UnsupportedParam {
        line: usize,
        param: String,
        ty: String,
    },
    #[error("line {line}: attribute `[{attr}]` on `{param}` requires a pointer type")]
    AttributeOnValue {
        line: usize,
        param: String,
        attr: String,
    },
    #[error("line {line}: invalid identifier `{ident}`")]
    BadIdentifier { line: usize, ident: String },
}

/// Parse every declaration in `source`, tagging each with `capability`.
pub fn parse_declarations(
    capability: &'static str,
    source: &str,
) -> Result<Vec<MethodDescriptor>, DeclError> {
    let mut methods = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let text = match raw.find("//") {
            Some(pos) => &raw[..pos],
            None => raw,
        }
        .trim();
        if text.is_empty() {
            continue;
        }
        methods.push(parse_line(capability, line, text)?);
    }
    Ok(methods)
}

fn parse_line(capability: &'static str, line: usize, text: &str) -> Result<MethodDescriptor, DeclError> {
    let malformed = || DeclError::Malformed {
        line,
        text: text.to_string(),
    };

    let body = text.strip_prefix("virtual ").unwrap_or(text).trim();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();
    let body = body.strip_suffix(')').ok_or_else(malformed)?;
    let (head, params) = body.split_once('(').ok_or_else(malformed)?;

    let head = spaced_pointers(head);
    let mut head_tokens: Vec<&str> = head.split_whitespace().collect();
    let name = head_tokens.pop().ok_or_else(malformed)?;
    if head_tokens.is_empty() {
        return Err(malformed());
    }
    check_ident(line, name)?;

    let ret_ty = head_tokens.join(" ");
    let result = return_kind(&ret_ty).ok_or(DeclError::UnsupportedReturn { line, ty: ret_ty })?;

    let params = if params.trim().is_empty() {
        Vec::new()
    } else {
        params.split(',').map(str::trim).collect::<Vec<_>>()
    };

    let specs = merge_attribute_commas(&params)
        .iter()
        .map(|param| parse_param(line, param))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MethodDescriptor::new(name, capability, specs, result))
}

/// `[in,out]` contains a comma, so re-join fragments split inside brackets.
fn merge_attribute_commas(fragments: &[&str]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(fragments.len());
    let mut open = false;
    for fragment in fragments {
        if open && let Some(last) = merged.last_mut() {
            last.push(',');
            last.push_str(fragment);
        } else {
            merged.push((*fragment).to_string());
        }
        let current = merged.last().map(String::as_str).unwrap_or_default();
        open = current.matches('[').count() > current.matches(']').count();
    }
    merged
}

fn parse_param(line: usize, text: &str) -> Result<ParamSpec, DeclError> {
    let malformed = || DeclError::Malformed {
        line,
        text: text.to_string(),
    };

    let (attr, rest) = match text.strip_prefix('[') {
        Some(rest) => {
            let (attr, rest) = rest.split_once(']').ok_or_else(malformed)?;
            (Some(attr.replace(' ', "")), rest.trim())
        }
        None => (None, text),
    };

    let rest = spaced_pointers(rest);
    let mut tokens: Vec<&str> = rest.split_whitespace().collect();
    let name = tokens.pop().ok_or_else(malformed)?;
    if tokens.is_empty() {
        return Err(malformed());
    }
    check_ident(line, name)?;
    let ty = tokens.join(" ");

    let (kind, pointer) = param_kind(&ty).ok_or_else(|| DeclError::UnsupportedParam {
        line,
        param: name.to_string(),
        ty: ty.clone(),
    })?;

    let direction = match (attr.as_deref(), pointer) {
        (None, false) | (Some("in"), false) => Direction::In,
        (None, true) | (Some("out"), true) => Direction::Out,
        (Some("in,out" | "out,in"), true) => Direction::InOut,
        (Some(attr), _) => {
            return Err(DeclError::AttributeOnValue {
                line,
                param: name.to_string(),
                attr: attr.to_string(),
            });
        }
    };

    Ok(ParamSpec::new(name, kind, direction))
}

fn spaced_pointers(text: &str) -> String {
    text.replace('*', " * ")
}

fn check_ident(line: usize, ident: &str) -> Result<(), DeclError> {
    let mut chars = ident.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DeclError::BadIdentifier {
            line,
            ident: ident.to_string(),
        })
    }
}

fn return_kind(ty: &str) -> Option<ValueKind> {
    match ty {
        "long" => Some(ValueKind::Int32),
        "LONGLONG" => Some(ValueKind::Int64),
        "float" => Some(ValueKind::Float32),
        "double" => Some(ValueKind::Float64),
        "CString" => Some(ValueKind::Text),
        _ => None,
    }
}

/// Returns the kind and whether the declaration is a pointer.
fn param_kind(ty: &str) -> Option<(ValueKind, bool)> {
    match ty {
        "long" => Some((ValueKind::Int32, false)),
        "LONGLONG" => Some((ValueKind::Int64, false)),
        "float" => Some((ValueKind::Float32, false)),
        "double" => Some((ValueKind::Float64, false)),
        "const TCHAR *" | "CString" => Some((ValueKind::Text, false)),
        "long *" => Some((ValueKind::Int32, true)),
        "LONGLONG *" => Some((ValueKind::Int64, true)),
        "float *" => Some((ValueKind::Float32, true)),
        "double *" => Some((ValueKind::Float64, true)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_declaration() {
        let src = "long FindColor(long x1,long y1,long x2,long y2,const TCHAR * color,double sim,long dir,long * x,long * y);";
        let methods = parse_declarations("color", src).unwrap();
        assert_eq!(methods.len(), 1);
        let find = &methods[0];
        assert_eq!(find.name, "FindColor");
        assert_eq!(find.capability, "color");
        assert_eq!(find.result, ValueKind::Int32);
        assert_eq!(find.arity(), 9);
        assert_eq!(find.params[4], ParamSpec::input("color", ValueKind::Text));
        assert_eq!(find.params[5].kind, ValueKind::Float64);
        assert_eq!(find.params[8].direction, Direction::Out);
        assert_eq!(find.by_ref_positions().collect::<Vec<_>>(), vec![7, 8]);
    }

    #[test]
    fn test_cstring_parameter_is_text() {
        let src = "long WriteIni(CString section,const TCHAR * key);";
        let methods = parse_declarations("file", src).unwrap();
        assert_eq!(methods[0].params[0], ParamSpec::input("section", ValueKind::Text));
        assert_eq!(methods[0].params[1].kind, ValueKind::Text);
    }

    #[test]
    fn test_parse_skips_comments_and_virtual() {
        let src = r"
            // window helpers
            virtual CString GetWindowTitle(long hwnd);

            long GetForegroundWindow();   // no params
        ";
        let methods = parse_declarations("window", src).unwrap();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].result, ValueKind::Text);
        assert!(methods[1].params.is_empty());
    }

    #[test]
    fn test_in_out_attribute() {
        let src = "long ClientToScreen(long hwnd,[in,out] long * x,[in, out] long *y);";
        let method = &parse_declarations("window", src).unwrap()[0];
        assert_eq!(method.params[1].direction, Direction::InOut);
        assert_eq!(method.params[2].direction, Direction::InOut);
        assert_eq!(method.params[2].name, "y");
    }

    #[test]
    fn test_int64_and_float_kinds() {
        let src = "LONGLONG ReadIntAddr(long hwnd,LONGLONG addr,long tpe);\nfloat ReadFloat(long hwnd,const TCHAR * addr);";
        let methods = parse_declarations("memory", src).unwrap();
        assert_eq!(methods[0].result, ValueKind::Int64);
        assert_eq!(methods[0].params[1].kind, ValueKind::Int64);
        assert_eq!(methods[1].result, ValueKind::Float32);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let src = "long Ok();\nvoid Nope();";
        assert_eq!(
            parse_declarations("x", src),
            Err(DeclError::UnsupportedReturn {
                line: 2,
                ty: "void".to_string()
            })
        );

        let src = "long Broken(long a";
        assert!(matches!(
            parse_declarations("x", src),
            Err(DeclError::Malformed { line: 1, .. })
        ));

        let src = "long Bad([in,out] long a);";
        assert!(matches!(
            parse_declarations("x", src),
            Err(DeclError::AttributeOnValue { line: 1, .. })
        ));

        let src = "long Odd(BYTE b);";
        assert!(matches!(
            parse_declarations("x", src),
            Err(DeclError::UnsupportedParam { line: 1, .. })
        ));
    }
}
