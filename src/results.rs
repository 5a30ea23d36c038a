//! Parsers for the text encodings of the `Ex`, `E` and list-returning
//! methods.
//!
//! | encoding | example | produced by |
//! |----------|---------|-------------|
//! | `id,x,y\|...` | `0,10,20\|1,30,40` | `FindPicEx`, `FindStrEx`, `FindStrFastEx` |
//! | `x,y\|...` | `10,20\|11,20` | `FindColorEx`, `FindMultiColorEx`, `FindShapeEx` |
//! | `id\|x\|y` | `2\|10\|20` | `FindPicE`, `FindStrE`, `FindStrFastE` |
//! | `x\|y` | `10\|20` | `FindColorE`, `FindMultiColorE`, `FindShapeE` |
//!
//! `-1` in any field of a single-hit encoding means nothing was found.

use dmsoft_bridge::MarshalError;

use crate::args::{Found, Hwnd, Point, Size};

type ParseResult<T> = std::result::Result<T, MarshalError>;

fn malformed(format: &'static str, text: &str) -> MarshalError {
    MarshalError::ResultText {
        format,
        text: text.to_string(),
    }
}

fn fields<const N: usize>(
    format: &'static str,
    whole: &str,
    item: &str,
    sep: char,
) -> ParseResult<[i32; N]> {
    let mut out = [0; N];
    let mut parts = item.split(sep);
    for slot in &mut out {
        *slot = parts
            .next()
            .and_then(|part| part.trim().parse().ok())
            .ok_or_else(|| malformed(format, whole))?;
    }
    if parts.next().is_some() {
        return Err(malformed(format, whole));
    }
    Ok(out)
}

fn entries(text: &str) -> impl Iterator<Item = &str> {
    text.split('|').map(str::trim).filter(|entry| !entry.is_empty())
}

/// `id,x,y|id,x,y|...`. Empty text is an empty list.
pub fn parse_ex_positions(text: &str) -> ParseResult<Vec<Found>> {
    entries(text)
        .map(|entry| {
            let [index, x, y] = fields("id,x,y list", text, entry, ',')?;
            Ok(Found {
                index,
                point: Point::new(x, y),
            })
        })
        .collect()
}

/// `x,y|x,y|...`. Empty text is an empty list.
pub fn parse_points(text: &str) -> ParseResult<Vec<Point>> {
    entries(text)
        .map(|entry| {
            let [x, y] = fields("x,y list", text, entry, ',')?;
            Ok(Point::new(x, y))
        })
        .collect()
}

/// `id|x|y`, `None` when the object reported `-1`.
pub fn parse_e_triplet(text: &str) -> ParseResult<Option<Found>> {
    let [index, x, y] = fields("id|x|y", text, text.trim(), '|')?;
    if index < 0 || x < 0 || y < 0 {
        return Ok(None);
    }
    Ok(Some(Found {
        index,
        point: Point::new(x, y),
    }))
}

/// `x|y`, `None` when the object reported `-1`.
pub fn parse_e_pair(text: &str) -> ParseResult<Option<Point>> {
    let [x, y] = fields("x|y", text, text.trim(), '|')?;
    if x < 0 || y < 0 {
        return Ok(None);
    }
    Ok(Some(Point::new(x, y)))
}

/// `w,h` as returned by `GetPicSize`.
pub fn parse_size(text: &str) -> ParseResult<Size> {
    let [width, height] = fields("w,h", text, text.trim(), ',')?;
    Ok(Size::new(width, height))
}

/// Comma-separated window handles from the `EnumWindow*` family.
pub fn parse_handles(text: &str) -> ParseResult<Vec<Hwnd>> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map(Hwnd)
                .map_err(|_| malformed("window handle list", text))
        })
        .collect()
}

/// `char$x$y|...` from `OcrEx`.
pub fn parse_ocr_ex(text: &str) -> ParseResult<Vec<(String, Point)>> {
    entries(text)
        .map(|entry| {
            let mut parts = entry.rsplitn(3, '$');
            let y = parts.next();
            let x = parts.next();
            let word = parts.next();
            match (word, x, y) {
                (Some(word), Some(x), Some(y)) => {
                    let x = x.parse().map_err(|_| malformed("ocr list", text))?;
                    let y = y.parse().map_err(|_| malformed("ocr list", text))?;
                    Ok((word.to_string(), Point::new(x, y)))
                }
                _ => Err(malformed("ocr list", text)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ex_positions() {
        let hits = parse_ex_positions("0,10,20|2,30,40").unwrap();
        assert_eq!(
            hits,
            vec![
                Found {
                    index: 0,
                    point: Point::new(10, 20)
                },
                Found {
                    index: 2,
                    point: Point::new(30, 40)
                },
            ]
        );
        assert!(parse_ex_positions("").unwrap().is_empty());
    }

    #[test]
    fn test_ex_positions_rejects_short_entries() {
        let err = parse_ex_positions("0,10|1,2,3").unwrap_err();
        assert!(matches!(err, MarshalError::ResultText { .. }));
    }

    #[test]
    fn test_points() {
        assert_eq!(
            parse_points("1,2|3,4|").unwrap(),
            vec![Point::new(1, 2), Point::new(3, 4)]
        );
        assert!(parse_points("1,2,3").is_err());
    }

    #[test]
    fn test_e_triplet_not_found() {
        assert_eq!(parse_e_triplet("-1|-1|-1").unwrap(), None);
        let found = parse_e_triplet("1|5|6").unwrap().unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.point, Point::new(5, 6));
        assert!(parse_e_triplet("1|5").is_err());
    }

    #[test]
    fn test_e_pair_and_size() {
        assert_eq!(parse_e_pair("7|8").unwrap(), Some(Point::new(7, 8)));
        assert_eq!(parse_e_pair("-1|-1").unwrap(), None);
        assert_eq!(parse_size("32,16").unwrap(), Size::new(32, 16));
    }

    #[test]
    fn test_handles() {
        assert_eq!(parse_handles("100,200").unwrap(), vec![Hwnd(100), Hwnd(200)]);
        assert!(parse_handles("").unwrap().is_empty());
        assert!(parse_handles("12,x").is_err());
    }

    #[test]
    fn test_ocr_ex() {
        let chars = parse_ocr_ex("a$1$2|$$3$4").unwrap();
        assert_eq!(chars[0], ("a".to_string(), Point::new(1, 2)));
        assert_eq!(chars[1], ("$".to_string(), Point::new(3, 4)));
    }
}
