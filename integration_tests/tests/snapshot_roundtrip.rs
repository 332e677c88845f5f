mod common;

use anyhow::Result;
use bevy_math::Vec2;
use fog_core::{decode_snapshot, encode_snapshot, FactionId, Observer};

/// Cross-session fog memory: capture after some exploration, restore into a
/// fresh engine over the same grid, and keep playing.
#[test]
fn exploration_survives_an_engine_restart() -> Result<()> {
    let mut engine = common::test_engine();
    let a = FactionId(0);
    let b = FactionId(5);

    for tick in 0..3 {
        let t = tick as f32;
        engine.run_frame([
            Observer::new(a, Vec2::new(1.0 + t * 2.0, 1.0), 1.5),
            Observer::new(b, Vec2::new(8.0, 8.0 - t), 1.0),
        ])?;
    }

    let bytes = encode_snapshot(&engine.capture_snapshot())?;

    // "Next session": same configuration, fresh engine.
    let mut restored = common::test_engine();
    restored.restore_snapshot(&decode_snapshot(&bytes)?)?;

    assert_eq!(restored.frame(), 3);
    for pos in [Vec2::new(1.0, 1.0), Vec2::new(3.0, 1.0), Vec2::new(5.0, 1.0)] {
        assert!(restored.is_revealed(a, pos), "{pos:?} lost from history");
        assert!(!restored.is_visible(a, pos));
    }
    assert!(restored.is_revealed(b, Vec2::new(8.0, 6.0)));
    assert!(!restored.is_revealed(b, Vec2::new(1.0, 1.0)));

    // The restored engine keeps ticking normally.
    restored.run_frame([Observer::new(a, Vec2::new(9.0, 9.0), 1.0)])?;
    assert!(restored.is_visible(a, Vec2::new(9.0, 9.0)));
    assert!(restored.is_revealed(a, Vec2::new(1.0, 1.0)));
    Ok(())
}

/// Snapshots are plain serde data; a JSON round trip matches the bincode
/// round trip.
#[test]
fn snapshot_is_serde_portable() -> Result<()> {
    let mut engine = common::test_engine();
    engine.run_frame([Observer::new(FactionId(2), Vec2::new(4.0, 4.0), 2.0)])?;

    let snapshot = engine.capture_snapshot();
    let json = serde_json::to_string(&snapshot)?;
    let from_json: fog_core::FogSnapshot = serde_json::from_str(&json)?;
    assert_eq!(from_json, snapshot);

    let from_bincode = decode_snapshot(&encode_snapshot(&snapshot)?)?;
    assert_eq!(from_bincode, snapshot);
    Ok(())
}
