//! Resource lifecycle, bounded waits and shared use of one facade.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use dmsoft::{
    BridgeConfig, CaptureHandle, Convention, Dmsoft, Error, Faq, Hwnd, LifecycleError, Memory,
    PicColor, Point, Rect, RemoteAddr, ScreenDataHandle, System, WaitExt, WaitOutcome, results,
};
use dmsoft_bridge::{StubObject, Variant};

fn facade(stub: StubObject) -> Dmsoft<StubObject> {
    Dmsoft::with_object(stub, BridgeConfig::default()).unwrap()
}

#[test]
fn test_picture_lifecycle() {
    let stub = StubObject::new()
        .with_value("LoadPic", Variant::I4(1))
        .with_value("FreePic", Variant::I4(1));
    let stats = stub.stats();
    let dm = facade(stub);

    let err = dm.free_pic("never.bmp").unwrap_err();
    assert!(matches!(
        err,
        Error::HandleLifecycle(LifecycleError::Unknown { .. })
    ));
    assert_eq!(stats.calls_to("FreePic"), 0);

    assert_eq!(dm.load_pic("a.bmp|B.bmp").unwrap(), 1);
    assert_eq!(dm.free_pic("A.bmp").unwrap(), 1);
    let err = dm.free_pic("a.bmp").unwrap_err();
    assert!(matches!(
        err,
        Error::HandleLifecycle(LifecycleError::AlreadyFreed { .. })
    ));
    assert_eq!(dm.free_pic("b.bmp").unwrap(), 1);
    assert_eq!(stats.calls_to("FreePic"), 2);
}

#[test]
fn test_wildcard_free_marks_matching_pictures() {
    let stub = StubObject::new()
        .with_value("LoadPic", Variant::I4(1))
        .with_value("FreePic", Variant::I4(1));
    let stats = stub.stats();
    let dm = facade(stub);

    dm.load_pic("a.bmp|b.bmp|c.png").unwrap();
    assert_eq!(dm.free_pic("*.bmp").unwrap(), 1);
    assert!(matches!(
        dm.free_pic("a.bmp"),
        Err(Error::HandleLifecycle(LifecycleError::AlreadyFreed { .. }))
    ));
    assert_eq!(stats.calls_to("FreePic"), 1);

    assert_eq!(dm.free_pic("C.png").unwrap(), 1);
    assert_eq!(stats.calls_to("FreePic"), 2);
}

#[test]
fn test_screen_data_lifecycle() {
    let stub = StubObject::new()
        .with_value("GetScreenData", Variant::I4(0x4000))
        .with_value("FreeScreenData", Variant::I4(1));
    let stats = stub.stats();
    let dm = facade(stub);

    assert!(matches!(
        dm.free_screen_data(ScreenDataHandle(0x4000)),
        Err(Error::HandleLifecycle(LifecycleError::Unknown { .. }))
    ));
    let handle = dm.get_screen_data(Rect::new(0, 0, 50, 50)).unwrap().unwrap();
    assert_eq!(handle, ScreenDataHandle(0x4000));
    assert_eq!(dm.free_screen_data(handle).unwrap(), 1);
    assert!(matches!(
        dm.free_screen_data(handle),
        Err(Error::HandleLifecycle(LifecycleError::AlreadyFreed { .. }))
    ));
    assert_eq!(stats.calls_to("FreeScreenData"), 1);
}

#[test]
fn test_refused_free_can_be_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&attempts);
    let stub = StubObject::new()
        .with_value("GetScreenData", Variant::I4(0x4000))
        .with_method("FreeScreenData", move |_| {
            let status = if seen.fetch_add(1, Ordering::SeqCst) == 0 { 0 } else { 1 };
            Ok(Variant::I4(status))
        });
    let dm = facade(stub);

    let handle = dm.get_screen_data(Rect::new(0, 0, 50, 50)).unwrap().unwrap();
    assert_eq!(dm.free_screen_data(handle).unwrap(), 0);
    assert_eq!(dm.free_screen_data(handle).unwrap(), 1);
    assert!(dm.free_screen_data(handle).is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_remote_memory_lifecycle() {
    let stub = StubObject::new()
        .with_value("VirtualAllocEx", Variant::I8(0x10000))
        .with_value("VirtualFreeEx", Variant::I4(1));
    let stats = stub.stats();
    let dm = facade(stub);

    assert!(matches!(
        dm.virtual_free_ex(Hwnd(1), RemoteAddr(0x20000)),
        Err(Error::HandleLifecycle(LifecycleError::Unknown { .. }))
    ));
    let addr = dm.virtual_alloc_ex(Hwnd(1), 0, 4096, 0).unwrap().unwrap();
    assert_eq!(addr, RemoteAddr(0x10000));
    assert_eq!(dm.virtual_free_ex(Hwnd(1), addr).unwrap(), 1);
    assert!(matches!(
        dm.virtual_free_ex(Hwnd(1), addr),
        Err(Error::HandleLifecycle(LifecycleError::AlreadyFreed { .. }))
    ));
    assert_eq!(stats.calls_to("VirtualFreeEx"), 1);
}

#[test]
fn test_same_address_in_two_processes() {
    let stub = StubObject::new()
        .with_value("VirtualAllocEx", Variant::I8(0x10000))
        .with_value("VirtualFreeEx", Variant::I4(1));
    let dm = facade(stub);

    let first = dm.virtual_alloc_ex(Hwnd(1), 0, 64, 0).unwrap().unwrap();
    let second = dm.virtual_alloc_ex(Hwnd(2), 0, 64, 0).unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(dm.virtual_free_ex(Hwnd(1), first).unwrap(), 1);
    assert_eq!(dm.virtual_free_ex(Hwnd(2), second).unwrap(), 1);
    assert!(matches!(
        dm.virtual_free_ex(Hwnd(2), RemoteAddr(0x10000)),
        Err(Error::HandleLifecycle(LifecycleError::AlreadyFreed { .. }))
    ));
}

#[test]
fn test_capture_use_after_release() {
    let stub = StubObject::new()
        .with_value("FaqCapture", Variant::I4(9))
        .with_value("FaqRelease", Variant::I4(1))
        .with_value("FaqGetSize", Variant::I4(2048))
        .with_value("FaqSend", Variant::text("answer"));
    let stats = stub.stats();
    let dm = facade(stub);

    let capture = dm
        .faq_capture(Rect::new(0, 0, 100, 100), 50, 0, 0)
        .unwrap()
        .unwrap();
    assert_eq!(capture, CaptureHandle(9));
    assert_eq!(dm.faq_get_size(capture).unwrap(), 2048);
    assert_eq!(dm.faq_release(capture).unwrap(), 1);

    let err = dm.faq_send("127.0.0.1:12345", capture, 0, 1000).unwrap_err();
    assert!(matches!(
        err,
        Error::HandleLifecycle(LifecycleError::UseAfterFree { .. })
    ));
    assert_eq!(stats.calls_to("FaqSend"), 0);

    assert!(matches!(
        dm.faq_release(capture),
        Err(Error::HandleLifecycle(LifecycleError::AlreadyFreed { .. }))
    ));
    assert!(matches!(
        dm.faq_release(CaptureHandle(77)),
        Err(Error::HandleLifecycle(LifecycleError::Unknown { .. }))
    ));
}

#[test]
fn test_tracking_disabled_forwards_everything() {
    let stub = StubObject::new().with_value("FreePic", Variant::I4(0));
    let stats = stub.stats();
    let config = BridgeConfig {
        track_resources: false,
        ..BridgeConfig::default()
    };
    let dm = Dmsoft::with_object(stub, config).unwrap();

    assert_eq!(dm.free_pic("never.bmp").unwrap(), 0);
    assert_eq!(stats.calls_to("FreePic"), 1);
}

#[test]
fn test_wait_times_out_after_budget() {
    let stub = StubObject::new().with_value("FindColor", Variant::I4(0));
    let stats = stub.stats();
    let config = BridgeConfig {
        poll_interval_ms: 20,
        ..BridgeConfig::default()
    };
    let dm = Dmsoft::with_object(stub, config).unwrap();

    let started = Instant::now();
    let outcome = dm
        .wait_color(
            Rect::new(0, 0, 10, 10),
            "ffffff",
            1.0,
            0,
            Duration::from_millis(200),
        )
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(2));
    assert!(stats.invocations() >= 2);
}

#[test]
fn test_wait_stops_on_first_hit() {
    let stub = StubObject::new().with_method("FindPic", |args| {
        args[0].set(Variant::I4(8))?;
        args[1].set(Variant::I4(4))?;
        Ok(Variant::I4(2))
    });
    let dm = facade(stub);

    let outcome = dm
        .wait_pic(
            Rect::new(0, 0, 10, 10),
            "a.bmp|b.bmp|c.bmp",
            "000000",
            0.9,
            0,
            Duration::from_secs(5),
        )
        .unwrap();
    let found = outcome.ready().unwrap();
    assert_eq!(found.index, 2);
    assert_eq!(found.point, Point::new(4, 8));
}

#[test]
fn test_wait_aborts_on_structural_error() {
    let dm = facade(StubObject::new().with_value("FindColor", Variant::I4(0)));
    dm.release().unwrap();
    assert!(
        dm.wait_color(
            Rect::new(0, 0, 10, 10),
            "ffffff",
            1.0,
            0,
            Duration::from_secs(5)
        )
        .is_err()
    );
}

#[test]
fn test_guarded_threads_do_not_overlap() {
    let stub = StubObject::new()
        .with_value("Ver", Variant::text("1.0"))
        .with_lookup_delay(Duration::from_millis(30))
        .with_invoke_delay(Duration::from_millis(30));
    let stats = stub.stats();
    let dm = Arc::new(facade(stub));

    let workers: Vec<_> = (0..2)
        .map(|_| {
            let dm = Arc::clone(&dm);
            thread::spawn(move || {
                let section = dm.enter();
                let first = dm.ver().unwrap();
                let second = dm.ver().unwrap();
                section.leave();
                (first, second)
            })
        })
        .collect();
    for worker in workers {
        assert_eq!(worker.join().unwrap(), ("1.0".to_string(), "1.0".to_string()));
    }

    assert_eq!(stats.max_in_flight(), 1);
    assert_eq!(stats.lookups(), 1);
    assert_eq!(stats.invocations(), 4);
}

#[test]
fn test_unguarded_threads_share_one_lookup() {
    // Without the section, invocations may overlap; only the name cache is
    // shared safely.
    let stub = StubObject::new()
        .with_value("Ver", Variant::text("1.0"))
        .with_lookup_delay(Duration::from_millis(50));
    let stats = stub.stats();
    let dm = Arc::new(facade(stub));

    let workers: Vec<_> = (0..2)
        .map(|_| {
            let dm = Arc::clone(&dm);
            thread::spawn(move || dm.ver())
        })
        .collect();
    for worker in workers {
        assert!(worker.join().unwrap().is_ok());
    }

    assert_eq!(stats.lookups(), 1);
    assert_eq!(stats.max_in_flight_lookups(), 1);
    assert_eq!(stats.invocations(), 2);
}

#[test]
fn test_critical_section_is_reentrant() {
    let dm = facade(StubObject::new().with_value("Ver", Variant::text("1.0")));
    let outer = dm.enter();
    let inner = dm.enter();
    assert_eq!(dm.ver().unwrap(), "1.0");
    inner.leave();
    outer.leave();
}

#[test]
fn test_legacy_conventions() {
    let dm = facade(StubObject::new());
    dm.release().unwrap();
    assert_eq!(dm.ver().or_empty(), "");
    assert_eq!(dm.set_path("C:\\pics").or_sentinel(-1), -1);
}

#[test]
fn test_ex_results_parse() {
    let stub = StubObject::new().with_value("FindPicEx", Variant::text("0,10,20|1,30,40"));
    let dm = facade(stub);

    let text = dm
        .find_pic_ex(Rect::new(0, 0, 100, 100), "a.bmp|b.bmp", "000000", 0.9, 0)
        .unwrap();
    let hits = results::parse_ex_positions(&text).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[1].point, Point::new(30, 40));
}
