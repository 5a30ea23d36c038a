//! Invocation bridge behavior observed through the facade.

use std::sync::Arc;

use dmsoft::{
    ArgList, BridgeConfig, Dmsoft, Error, Hwnd, Int64Encoding, MarshalError, Memory, PicColor,
    Point, Rect, System, Window, method_table,
};
use dmsoft_bridge::{ConnectionError, ForeignError, StubObject, Variant, codes};

fn facade(stub: StubObject) -> Dmsoft<StubObject> {
    Dmsoft::with_object(stub, BridgeConfig::default()).unwrap()
}

#[test]
fn test_version_scenario() {
    let stub = StubObject::new().with_value("Ver", Variant::text("7.2336"));
    let stats = stub.stats();
    let dm = facade(stub);

    let version = dm.ver().unwrap();
    assert!(!version.is_empty());
    assert_eq!(version, "7.2336");
    assert_eq!(stats.invocations(), 1);
    assert_eq!(dm.handle().live_buffers(), 0);
}

#[test]
fn test_unknown_method_never_invokes() {
    let stub = StubObject::new().with_value("Ver", Variant::text("1.0"));
    let stats = stub.stats();
    let dm = facade(stub);

    let err = dm
        .call_dynamic("NoSuchMethod", ArgList::new().arg(1))
        .unwrap_err();
    assert!(err.is_method_not_found());
    assert_eq!(stats.invocations(), 0);
}

#[test]
fn test_declared_but_unrecognized_by_object() {
    // Declared in the table, missing from this stub.
    let stats;
    let err = {
        let stub = StubObject::new();
        stats = stub.stats();
        facade(stub).get_path().unwrap_err()
    };
    assert!(matches!(err, Error::MethodNotFound { ref name } if name == "GetPath"));
    assert_eq!(stats.lookups(), 1);
    assert_eq!(stats.invocations(), 0);
}

#[test]
fn test_undeclared_rejected_when_disabled() {
    let stub = StubObject::new().with_value("Secret", Variant::I4(1));
    let stats = stub.stats();
    let config = BridgeConfig {
        allow_undeclared: false,
        ..BridgeConfig::default()
    };
    let dm = Dmsoft::with_object(stub, config).unwrap();

    assert!(dm.call_dynamic("Secret", ArgList::new()).is_err());
    assert_eq!(stats.lookups(), 0);
}

#[test]
fn test_undeclared_call_forwards_natural_values() {
    let stub = StubObject::new().with_method("Echo", |args| Ok(args[0].value().clone()));
    let dm = facade(stub);

    let result = dm
        .call_dynamic("echo", ArgList::new().arg(5).arg("last"))
        .unwrap();
    assert_eq!(result.value::<String>().unwrap(), "last");
}

#[test]
fn test_before_acquire_and_after_release() {
    let detached = Dmsoft::<StubObject>::detached(BridgeConfig::default()).unwrap();
    assert!(!detached.is_valid());
    assert!(matches!(
        detached.ver(),
        Err(Error::Connection(ConnectionError::NotAcquired))
    ));

    let stub = StubObject::new().with_value("Ver", Variant::text("1.0"));
    let stats = stub.stats();
    let dm = facade(stub);
    dm.release().unwrap();
    assert_eq!(stats.releases(), 1);
    assert!(matches!(
        dm.ver(),
        Err(Error::Connection(ConnectionError::Released))
    ));
    assert!(matches!(dm.release(), Err(Error::HandleLifecycle(_))));
    assert_eq!(stats.invocations(), 0);
}

#[test]
fn test_failed_acquire_is_connection_error() {
    let err = Dmsoft::<StubObject>::acquire_with(
        |_| Err(ForeignError::new(codes::REGDB_E_CLASSNOTREG, "class not registered")),
        BridgeConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::Connection(ConnectionError::Instantiate { .. })
    ));
    assert_eq!(err.foreign_code(), Some(codes::REGDB_E_CLASSNOTREG));
}

#[test]
fn test_same_name_resolved_once() {
    let stub = StubObject::new().with_value("Ver", Variant::text("1.0"));
    let stats = stub.stats();
    let dm = facade(stub);

    dm.ver().unwrap();
    dm.ver().unwrap();
    assert_eq!(stats.lookups(), 1);
    assert_eq!(stats.invocations(), 2);
    assert_eq!(dm.stats().cache_hits, 1);
}

#[test]
fn test_presentation_order_is_reversed() {
    let stub = StubObject::new().with_method("FindColor", |args| {
        // y, x, dir, sim, color, y2, x2, y1, x1
        args[0].set(Variant::I4(20))?;
        args[1].set(Variant::I4(10))?;
        Ok(Variant::I4(1))
    });
    let stats = stub.stats();
    let dm = facade(stub);

    let hit = dm
        .find_color(Rect::new(1, 2, 300, 400), "ff0000-000000", 0.9, 0)
        .unwrap();
    assert_eq!(hit, Some(Point::new(10, 20)));

    let call = stats.last_call().unwrap();
    assert_eq!(call.args.len(), 9);
    assert_eq!(call.args[2], Variant::I4(0));
    assert_eq!(call.args[3], Variant::R8(0.9));
    assert_eq!(call.args[4].to_text().as_deref(), Some("ff0000-000000"));
    assert_eq!(call.args[5], Variant::I4(400));
    assert_eq!(call.args[8], Variant::I4(1));
}

#[test]
fn test_out_slots_start_zeroed_and_do_not_alias() {
    let stub = StubObject::new().with_method("GetCursorPos", |args| {
        assert_eq!(args[0].value(), &Variant::I4(0));
        assert_eq!(args[1].value(), &Variant::I4(0));
        args[1].set(Variant::I4(111))?;
        assert_eq!(args[0].value(), &Variant::I4(0));
        args[0].set(Variant::I4(222))?;
        Ok(Variant::I4(1))
    });
    let dm = facade(stub);

    use dmsoft::KeyboardMouse;
    assert_eq!(dm.get_cursor_pos().unwrap(), Some(Point::new(111, 222)));
}

#[test]
fn test_in_out_round_trip() {
    let stub = StubObject::new().with_method("ClientToScreen", |args| {
        let y = args[0].value().as_i32().unwrap_or_default();
        let x = args[1].value().as_i32().unwrap_or_default();
        assert_eq!((x, y), (5, 7));
        assert_eq!(args[2].value(), &Variant::I4(0x1234));
        args[1].set(Variant::I4(x + 100))?;
        args[0].set(Variant::I4(y + 200))?;
        Ok(Variant::I4(1))
    });
    let dm = facade(stub);

    let moved = dm
        .client_to_screen(Hwnd(0x1234), Point::new(5, 7))
        .unwrap();
    assert_eq!(moved, Some(Point::new(105, 207)));
}

#[test]
fn test_inverted_rect_never_reaches_object() {
    let stub = StubObject::new().with_value("FindColor", Variant::I4(1));
    let stats = stub.stats();
    let dm = facade(stub);

    let err = dm
        .find_color(Rect::new(100, 100, 50, 50), "ffffff", 1.0, 0)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Marshal(MarshalError::InvertedRect { .. })
    ));
    assert_eq!(stats.invocations(), 0);
    assert_eq!(dm.stats().invocations, 0);
}

#[test]
fn test_empty_color_never_reaches_object() {
    let stub = StubObject::new().with_value("Ocr", Variant::text("x"));
    let stats = stub.stats();
    let dm = facade(stub);

    use dmsoft::TextOcr;
    let err = dm.ocr(Rect::new(0, 0, 10, 10), " ", 0.9).unwrap_err();
    assert!(matches!(
        err,
        Error::Marshal(MarshalError::EmptyText { param: "color" })
    ));
    assert_eq!(stats.invocations(), 0);
}

#[test]
fn test_foreign_failure_is_not_retried() {
    let stub = StubObject::new().with_method("Ver", |_| {
        Err(ForeignError::new(codes::E_FAIL, "object busy"))
    });
    let stats = stub.stats();
    let dm = facade(stub);

    let err = dm.ver().unwrap_err();
    assert!(matches!(err, Error::InvocationFailed { .. }));
    assert_eq!(err.foreign_code(), Some(codes::E_FAIL));
    assert_eq!(stats.invocations(), 1);
    assert_eq!(
        dm.last_foreign_error().map(|err| err.code),
        Some(codes::E_FAIL)
    );
    assert_eq!(dm.stats().failures, 1);
    assert_eq!(dm.handle().live_buffers(), 0);
}

#[test]
fn test_int64_as_decimal_text() {
    let stub = StubObject::new().with_method("VirtualAllocEx", |args| {
        // kind, size, addr, hwnd
        assert_eq!(args[2].value().to_text().as_deref(), Some("0"));
        Ok(Variant::text("4294967296"))
    });
    let config = BridgeConfig {
        int64_encoding: Int64Encoding::DecimalText,
        ..BridgeConfig::default()
    };
    let dm = Dmsoft::with_object(stub, config).unwrap();

    let block = dm.virtual_alloc_ex(Hwnd(1), 0, 4096, 0).unwrap().unwrap();
    assert_eq!(block.0, 4_294_967_296);
}

#[test]
fn test_method_table_covers_every_capability() {
    let table = method_table().unwrap();
    assert_eq!(table.len(), 415);
    assert_eq!(table.capabilities().len(), 9);
    assert!(Arc::ptr_eq(&table, &method_table().unwrap()));

    let find_color = table.resolve("findcolor").unwrap();
    assert_eq!(find_color.name, "FindColor");
    assert_eq!(find_color.arity(), 9);
    assert_eq!(find_color.by_ref_positions().collect::<Vec<_>>(), vec![7, 8]);

    let client = table.resolve("ClientToScreen").unwrap();
    assert_eq!(client.by_ref_positions().count(), 2);
    assert_eq!(table.capability("faq").len(), 10);
}
