//! Geometry, handle types and argument packing for the typed facade.

use std::fmt;

use dmsoft_bridge::{ArgList, ArgumentValue, FromValue, MarshalError, RawHandle};
use dmsoft_symbol::ValueKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared distance, enough for ordering.
    pub fn distance_sq(self, other: Point) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Screen rectangle, corners inclusive. Ordering is checked when the
/// rectangle is packed, so an inverted one never reaches the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Rectangle with top-left corner `origin` spanning `size`.
    pub fn from_size(origin: Point, size: Size) -> Result<Self, MarshalError> {
        let corner = origin
            .x
            .checked_add(size.width)
            .zip(origin.y.checked_add(size.height));
        match corner {
            Some((x2, y2)) => Ok(Self::new(origin.x, origin.y, x2, y2)),
            None => Err(MarshalError::RectOverflow {
                x: origin.x,
                y: origin.y,
                width: size.width,
                height: size.height,
            }),
        }
    }

    pub fn validate(self) -> Result<Self, MarshalError> {
        if self.x1 > self.x2 || self.y1 > self.y2 {
            return Err(MarshalError::InvertedRect {
                x1: self.x1,
                y1: self.y1,
                x2: self.x2,
                y2: self.y2,
            });
        }
        Ok(self)
    }

    pub fn width(self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(self) -> i32 {
        self.y2 - self.y1
    }

    pub fn contains(self, point: Point) -> bool {
        (self.x1..=self.x2).contains(&point.x) && (self.y1..=self.y2).contains(&point.y)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Hit of a search that reports which candidate matched and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Found {
    pub index: i32,
    pub point: Point,
}

/// Raw 24-bit bitmap of a screen region, owned by the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenBitmap {
    pub data: i64,
    pub size: i32,
}

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);

        impl $name {
            pub fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }

        impl FromValue for $name {
            fn from_value(method: &str, value: ArgumentValue) -> Result<Self, MarshalError> {
                RawHandle::from_value(method, value).map(|raw| $name(raw.0))
            }
        }

        impl PushArgs for $name {
            fn push_args(self, args: &mut ArgList) -> Result<(), MarshalError> {
                args.push(RawHandle(self.0));
                Ok(())
            }
        }
    };
}

handle_type! {
    /// Top-level or child window.
    Hwnd
}

handle_type! {
    /// Compressed capture buffered by the object for a faq transfer.
    CaptureHandle
}

handle_type! {
    /// Screen-data snapshot address returned by `GetScreenData`.
    ScreenDataHandle
}

handle_type! {
    /// Block allocated in another process by `VirtualAllocEx`.
    RemoteAddr
}

/// Append a value's wire arguments, checking local preconditions first.
pub trait PushArgs {
    fn push_args(self, args: &mut ArgList) -> Result<(), MarshalError>;
}

macro_rules! push_scalar {
    ($($ty:ty),*) => {
        $(
            impl PushArgs for $ty {
                fn push_args(self, args: &mut ArgList) -> Result<(), MarshalError> {
                    args.push(self);
                    Ok(())
                }
            }
        )*
    };
}

push_scalar!(i32, i64, f32, f64, bool, &str, String);

impl PushArgs for Point {
    fn push_args(self, args: &mut ArgList) -> Result<(), MarshalError> {
        args.push(self.x).push(self.y);
        Ok(())
    }
}

impl PushArgs for Size {
    fn push_args(self, args: &mut ArgList) -> Result<(), MarshalError> {
        args.push(self.width).push(self.height);
        Ok(())
    }
}

impl PushArgs for Rect {
    fn push_args(self, args: &mut ArgList) -> Result<(), MarshalError> {
        let rect = self.validate()?;
        args.push(rect.x1).push(rect.y1).push(rect.x2).push(rect.y2);
        Ok(())
    }
}

/// Color and format strings cannot be empty.
pub fn require_text(param: &'static str, value: &str) -> Result<(), MarshalError> {
    if value.trim().is_empty() {
        return Err(MarshalError::EmptyText { param });
    }
    Ok(())
}

/// `n` int32 out-slots.
pub(crate) fn push_outs(args: &mut ArgList, n: usize) {
    for _ in 0..n {
        args.push_out(ValueKind::Int32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_rect_is_rejected() {
        let mut args = ArgList::new();
        let err = Rect::new(100, 100, 50, 50).push_args(&mut args).unwrap_err();
        assert_eq!(
            err,
            MarshalError::InvertedRect {
                x1: 100,
                y1: 100,
                x2: 50,
                y2: 50
            }
        );
        assert!(args.is_empty());
    }

    #[test]
    fn test_degenerate_rect_is_accepted() {
        let mut args = ArgList::new();
        Rect::new(5, 5, 5, 5).push_args(&mut args).unwrap();
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn test_rect_geometry() {
        let rect = Rect::from_size(Point::new(10, 20), Size::new(30, 40)).unwrap();
        assert_eq!(rect, Rect::new(10, 20, 40, 60));
        assert_eq!((rect.width(), rect.height()), (30, 40));
        assert!(rect.contains(Point::new(40, 60)));
        assert!(!rect.contains(Point::new(41, 60)));
    }

    #[test]
    fn test_rect_from_size_overflow() {
        assert_eq!(
            Rect::from_size(Point::new(i32::MAX - 5, 0), Size::new(10, 10)),
            Err(MarshalError::RectOverflow {
                x: i32::MAX - 5,
                y: 0,
                width: 10,
                height: 10,
            })
        );
        assert!(Rect::from_size(Point::new(0, -20), Size::new(5, 20)).is_ok());
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("color", "ffffff-000000").is_ok());
        assert_eq!(
            require_text("color", "  "),
            Err(MarshalError::EmptyText { param: "color" })
        );
    }
}
