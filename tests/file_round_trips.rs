use std::fs;

use ac_config_editor::backup::{backup_path_for, BackupLedger, BackupOutcome};
use ac_config_editor::engine::{EngineConfig, EngineSession, ENGINE_SECTION, TORQUE_CURVE_KEY};
use ac_config_editor::gearbox::{read_gearbox_section, GearboxView};
use ac_config_editor::lut::{read_lut, write_lut, Delimiter, LutPoint, LutTable};
use ac_config_editor::point_editor::DEFAULT_HIT_RADIUS;
use ac_config_editor::session::{LutSession, RefreshOutcome, TEMP_FILE_NAME};
use ac_config_editor::LutError;
use pretty_assertions::assert_eq;

fn project(p: LutPoint) -> [f32; 2] {
    [p.x as f32, p.y as f32]
}

#[test]
fn test_pipe_table_writes_expected_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("power.lut");
    let table = LutTable::from_pairs(&[(1000.0, 50.0), (2000.0, 80.0)]);

    write_lut(&table, &path, Delimiter::Pipe).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "1000|50.0\n2000|80.0\n");

    let reloaded = read_lut(&path, Delimiter::Pipe).unwrap();
    assert_eq!(reloaded.points(), &[LutPoint::new(1000.0, 50.0), LutPoint::new(2000.0, 80.0)]);
}

#[test]
fn test_round_trip_both_formats() {
    let dir = tempfile::tempdir().unwrap();
    let table = LutTable::from_pairs(&[
        (0.0, 120.25),
        (1500.0, 180.0),
        (1500.0, 181.125),
        (900.5, -12.0),
        (7000.0, 1e-3),
    ]);
    for delimiter in Delimiter::ALL {
        let path = dir.path().join(format!("{delimiter:?}.lut"));
        write_lut(&table, &path, delimiter).unwrap();
        assert_eq!(read_lut(&path, delimiter).unwrap(), table);
    }
}

#[test]
fn test_empty_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.lut");
    fs::write(&path, "\n\n").unwrap();
    assert!(matches!(read_lut(&path, Delimiter::Pipe), Err(LutError::Empty(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_lut(&dir.path().join("nope.lut"), Delimiter::Pipe).unwrap_err();
    assert!(matches!(err, LutError::Io { .. }));
}

#[test]
fn test_two_loads_create_one_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("power.lut");
    let original = "1000|50.0\n2000|80.0\n";
    fs::write(&path, original).unwrap();
    let mut ledger = BackupLedger::new();

    let (mut session, first) =
        LutSession::open(&path, Delimiter::Pipe, DEFAULT_HIT_RADIUS, &mut ledger).unwrap();
    assert_eq!(first, BackupOutcome::Created(backup_path_for(&path)));

    // Edit and save, then load again: the backup must still hold the original.
    session.press([1000.0, 50.0], project);
    session.motion(65.0);
    session.release();
    session.save().unwrap();

    let (_, second) =
        LutSession::open(&path, Delimiter::Pipe, DEFAULT_HIT_RADIUS, &mut ledger).unwrap();
    assert_eq!(second, BackupOutcome::AlreadyHandled);

    let backups: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".backup"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(backup_path_for(&path)).unwrap(), original);
}

#[test]
fn test_failed_parse_takes_no_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.lut");
    fs::write(&path, "1000|50|7\n").unwrap();
    let mut ledger = BackupLedger::new();

    let err = LutSession::open(&path, Delimiter::Pipe, DEFAULT_HIT_RADIUS, &mut ledger).unwrap_err();
    assert!(matches!(err, LutError::Parse { line: 1, .. }));
    assert!(!backup_path_for(&path).exists());
}

#[test]
fn test_refresh_preserves_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("power.lut");
    fs::write(&path, "1000|50.0\n2000|80.0\n3000|95.5\n").unwrap();
    let mut ledger = BackupLedger::new();
    let (mut session, _) =
        LutSession::open(&path, Delimiter::Pipe, DEFAULT_HIT_RADIUS, &mut ledger).unwrap();

    session.press([2000.0, 80.0], project);
    session.motion(88.75);
    let before = session.table().clone();

    let outcome = session.refresh().unwrap();
    let temp = dir.path().join(TEMP_FILE_NAME);
    assert_eq!(outcome, RefreshOutcome::Reloaded(temp.clone()));
    assert_eq!(session.table(), &before);
    assert!(!session.editor().is_dragging());
    assert_eq!(
        fs::read_to_string(temp).unwrap(),
        "1000|50.0\n2000|88.75\n3000|95.5\n"
    );
    // The source file is untouched until an explicit save.
    assert_eq!(fs::read_to_string(&path).unwrap(), "1000|50.0\n2000|80.0\n3000|95.5\n");
    assert!(session.is_dirty());
}

#[test]
fn test_press_off_curve_then_motion_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("power.lut");
    fs::write(&path, "1000|50\n2000|80\n").unwrap();
    let mut ledger = BackupLedger::new();
    let (mut session, _) =
        LutSession::open(&path, Delimiter::Pipe, DEFAULT_HIT_RADIUS, &mut ledger).unwrap();
    let before = session.table().clone();

    assert_eq!(session.press([1500.0, 500.0], project), None);
    assert!(!session.motion(10.0));
    session.release();
    assert_eq!(session.table(), &before);
    assert!(!session.is_dirty());
}

#[test]
fn test_torque_curve_added_to_config_without_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.ini");
    fs::write(&path, "[HEADER]\nVERSION=1\n\n[TURBO_0]\nMAX_BOOST=1.2\n").unwrap();

    let mut session = EngineSession::open(&path).unwrap();
    let before: Vec<String> = session.config().document().section_names().map(String::from).collect();
    session.attach_torque_curve(std::path::Path::new("power.lut")).unwrap();

    let reloaded = EngineConfig::load(&path).unwrap();
    let after: Vec<&str> = reloaded.document().section_names().collect();
    assert_eq!(after, ["HEADER", "TURBO_0", ENGINE_SECTION]);
    assert_eq!(before.len() + 1, after.len());
    assert_eq!(reloaded.document().section(ENGINE_SECTION).unwrap().len(), 1);
    assert_eq!(reloaded.document().get(ENGINE_SECTION, TORQUE_CURVE_KEY), Some("power.lut"));
    assert_eq!(reloaded.document().get("TURBO_0", "MAX_BOOST"), Some("1.2"));
    assert_eq!(&reloaded, session.config());
}

#[test]
fn test_engine_session_on_missing_file_creates_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.ini");
    let mut session = EngineSession::open(&path).unwrap();
    session.attach_torque_curve(std::path::Path::new("power.lut")).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[ENGINE_DATA]\nTORQUE_CURVE = power.lut\n\n"
    );
}

#[test]
fn test_gearbox_section_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drivetrain.ini");
    fs::write(
        &path,
        "[TRACTION]\nTYPE=RWD\n\n[GEARBOX]\nCOUNT=6\nGEAR_R=-3.2\nGEAR_1=2.9\nFINAL=4.1\n",
    )
    .unwrap();

    let values = read_gearbox_section(&path).unwrap();
    let pairs: Vec<(&str, &str)> = values.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(
        pairs,
        [("COUNT", "6"), ("GEAR_R", "-3.2"), ("GEAR_1", "2.9"), ("FINAL", "4.1")]
    );
}

#[test]
fn test_gearbox_view_reports_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drivetrain.ini");
    fs::write(&path, "[GEARBOX\nCOUNT=6\n").unwrap();

    let mut view = GearboxView::default();
    let err = view.load(&path).expect("malformed header should be reported");
    assert!(err.to_string().contains("line 1"));
    assert!(view.values().is_empty());
    assert_eq!(view.path(), Some(path.as_path()));
}
