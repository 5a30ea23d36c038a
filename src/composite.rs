//! Reading composite results out of by-reference slots.

use dmsoft_bridge::{InvocationResult, Result};

use crate::args::{Found, Point, Rect, Size};

pub(crate) fn point_at(result: &InvocationResult, first: usize) -> Result<Point> {
    Ok(Point::new(result.out(first)?, result.out(first + 1)?))
}

/// Status-style searches: nonzero return means the slots hold a position.
pub(crate) fn point_if_found(result: &InvocationResult) -> Result<Option<Point>> {
    if result.value::<i32>()? == 0 {
        return Ok(None);
    }
    point_at(result, 0).map(Some)
}

/// Index-style searches: the return is the matched candidate, `-1` for none.
pub(crate) fn found_at(result: &InvocationResult) -> Result<Option<Found>> {
    let index = result.value::<i32>()?;
    if index < 0 {
        return Ok(None);
    }
    Ok(Some(Found {
        index,
        point: point_at(result, 0)?,
    }))
}

/// Name-style searches: an empty name means nothing matched.
pub(crate) fn named_point(result: &InvocationResult) -> Result<Option<(String, Point)>> {
    let name = result.value::<String>()?;
    if name.is_empty() {
        return Ok(None);
    }
    Ok(Some((name, point_at(result, 0)?)))
}

pub(crate) fn size_if_found(result: &InvocationResult) -> Result<Option<Size>> {
    if result.value::<i32>()? == 0 {
        return Ok(None);
    }
    Ok(Some(Size::new(result.out(0)?, result.out(1)?)))
}

pub(crate) fn rect_if_found(result: &InvocationResult) -> Result<Option<Rect>> {
    if result.value::<i32>()? == 0 {
        return Ok(None);
    }
    Ok(Some(Rect::new(
        result.out(0)?,
        result.out(1)?,
        result.out(2)?,
        result.out(3)?,
    )))
}
