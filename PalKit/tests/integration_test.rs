use palkit::extract::{
    AttemptFailure, CANDIDATE_SIZES, FRAMES_PER_CHARACTER, RasterizerKind, SkipReason,
};
use palkit::prelude::*;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

// ============================================================================
// Fixtures
// ============================================================================

/// Sprite archive: u16 count, count + 1 word offsets, then the payloads.
/// Payload lengths must be even.
fn build_smkf(payloads: &[Vec<u8>]) -> Vec<u8> {
    let count = payloads.len();
    let header_len = (count + 2) * 2;
    let mut out = Vec::new();
    out.extend_from_slice(&(count as u16).to_le_bytes());

    let mut cursor = header_len;
    for payload in payloads {
        out.extend_from_slice(&((cursor / 2) as u16).to_le_bytes());
        cursor += payload.len();
    }
    out.extend_from_slice(&((cursor / 2) as u16).to_le_bytes());

    for payload in payloads {
        out.extend_from_slice(payload);
    }
    out
}

/// Primary MKF archive with one entry per payload.
fn build_mkf(payloads: &[Vec<u8>]) -> Vec<u8> {
    let table_len = (payloads.len() + 1) * 4;
    let mut out = Vec::new();
    let mut cursor = table_len;
    for payload in payloads {
        out.extend_from_slice(&(cursor as u32).to_le_bytes());
        cursor += payload.len();
    }
    out.extend_from_slice(&(cursor as u32).to_le_bytes());
    for payload in payloads {
        out.extend_from_slice(payload);
    }
    out
}

fn frames(count: usize) -> Vec<Vec<u8>> {
    (0..count).map(|i| vec![i as u8; 4]).collect()
}

struct Workspace {
    _dir: TempDir,
    config: ExtractConfig,
}

impl Workspace {
    fn new(characters: &[(&str, &str)]) -> Self {
        let dir = tempdir().unwrap();
        let config = ExtractConfig {
            input_dir: dir.path().join("sprites"),
            palette_dir: dir.path().join("PAL"),
            output_dir: dir.path().join("out/images"),
            characters: characters
                .iter()
                .map(|(archive, label)| CharacterEntry::new(*archive, *label))
                .collect(),
            ..ExtractConfig::default()
        };
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::create_dir_all(&config.palette_dir).unwrap();
        Self { _dir: dir, config }
    }

    fn write_archive(&self, name: &str, data: &[u8]) {
        fs::write(self.config.input_dir.join(name), data).unwrap();
    }

    fn output(&self, name: &str) -> PathBuf {
        self.config.output_dir.join(name)
    }
}

// ============================================================================
// Mock backends
// ============================================================================

struct Echo;

impl Decompressor for Echo {
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// Drops the 4-byte marker, leaving the payload behind it.
struct StripMarker;

impl Decompressor for StripMarker {
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data[4..].to_vec())
    }
}

struct Corrupt;

impl Decompressor for Corrupt {
    fn decode(&self, _data: &[u8]) -> Result<Vec<u8>> {
        Err(Error::DecompressionFailed {
            message: "bad block header".to_string(),
        })
    }
}

/// Records every call; writes a 600-byte file for accepted sizes.
struct MockRasterizer {
    accept: Vec<FrameSize>,
    calls: RefCell<Vec<(usize, FrameSize)>>,
}

impl MockRasterizer {
    fn accepting(accept: &[FrameSize]) -> Self {
        Self {
            accept: accept.to_vec(),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn always_succeeds() -> Self {
        Self::accepting(&CANDIDATE_SIZES)
    }

    fn always_fails() -> Self {
        Self::accepting(&[])
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Rasterizer for MockRasterizer {
    fn convert(&self, frame: &[u8], size: FrameSize, _palette: &Path, output: &Path) -> Result<()> {
        self.calls.borrow_mut().push((frame.len(), size));
        if self.accept.contains(&size) {
            fs::write(output, vec![0xAB; 600])?;
            Ok(())
        } else {
            Err(Error::RasterToolFailed {
                status: "exit status: 1".to_string(),
                stderr: "wrong size".to_string(),
            })
        }
    }
}

fn frame_reports(report: &CharacterReport) -> &[FrameReport] {
    match &report.outcome {
        CharacterOutcome::Extracted { frames, .. } => frames,
        CharacterOutcome::Skipped(reason) => panic!("{} skipped: {reason}", report.label),
    }
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_first_six_frames_extracted_once_each() {
    let ws = Workspace::new(&[("sss0.sss", "xiaoyao")]);
    ws.write_archive("sss0.sss", &build_smkf(&frames(9)));
    let rasterizer = MockRasterizer::always_succeeds();

    let summary = SpriteExtractor::new(&ws.config, &Echo, &rasterizer)
        .run(&|_| {})
        .unwrap();

    assert_eq!(rasterizer.call_count(), FRAMES_PER_CHARACTER);
    assert_eq!(summary.extracted_count(), FRAMES_PER_CHARACTER);

    let report = &summary.characters[0];
    let frames = frame_reports(report);
    assert!(frames.iter().all(|f| f.attempts.len() == 1));
    assert!(matches!(
        report.outcome,
        CharacterOutcome::Extracted { frames_found: 9, compression: Compression::Raw, .. }
    ));
    for index in 0..FRAMES_PER_CHARACTER {
        assert!(ws.output(&format!("xiaoyao_frame{index}_48x72.png")).exists());
    }
    assert!(!ws.output("xiaoyao_frame6_48x72.png").exists());
}

#[test]
fn test_short_archive_extracts_every_frame() {
    let ws = Workspace::new(&[("sss1.sss", "linger")]);
    ws.write_archive("sss1.sss", &build_smkf(&frames(3)));
    let rasterizer = MockRasterizer::always_succeeds();

    let summary = SpriteExtractor::new(&ws.config, &Echo, &rasterizer)
        .run(&|_| {})
        .unwrap();

    assert_eq!(rasterizer.call_count(), 3);
    assert_eq!(summary.extracted_count(), 3);
}

#[test]
fn test_always_failing_rasterizer_completes() {
    let ws = Workspace::new(&[("sss2.sss", "yueru")]);
    ws.write_archive("sss2.sss", &build_smkf(&frames(8)));
    let rasterizer = MockRasterizer::always_fails();

    let summary = SpriteExtractor::new(&ws.config, &Echo, &rasterizer)
        .run(&|_| {})
        .unwrap();

    assert_eq!(summary.extracted_count(), 0);
    assert_eq!(summary.failed_count(), FRAMES_PER_CHARACTER);
    assert_eq!(
        rasterizer.call_count(),
        FRAMES_PER_CHARACTER * CANDIDATE_SIZES.len()
    );

    let frames = frame_reports(&summary.characters[0]);
    let sizes: Vec<_> = frames[0].attempts.iter().map(|a| a.size).collect();
    assert_eq!(sizes, CANDIDATE_SIZES.to_vec());
    assert!(matches!(
        frames[0].attempts[0].result,
        Err(AttemptFailure::ToolFailed { ref stderr, .. }) if stderr == "wrong size"
    ));
    assert!(!ws.output("yueru.png").exists());
}

#[test]
fn test_frames_are_passed_whole() {
    let ws = Workspace::new(&[("sss0.sss", "xiaoyao")]);
    let payloads = vec![vec![1; 2], vec![2; 6], vec![3; 10]];
    ws.write_archive("sss0.sss", &build_smkf(&payloads));
    let rasterizer = MockRasterizer::always_succeeds();

    SpriteExtractor::new(&ws.config, &Echo, &rasterizer)
        .run(&|_| {})
        .unwrap();

    let lengths: Vec<_> = rasterizer.calls.borrow().iter().map(|(len, _)| *len).collect();
    assert_eq!(lengths, vec![2, 6, 10]);
}

#[test]
fn test_missing_and_corrupt_characters_are_skipped() {
    let ws = Workspace::new(&[
        ("sss0.sss", "xiaoyao"),
        ("sss1.sss", "linger"),
        ("sss2.sss", "yueru"),
    ]);
    // sss0.sss is never written
    let mut compressed = b"YJ_1".to_vec();
    compressed.extend_from_slice(&[0x10, 0x00, 0x20, 0x00]);
    ws.write_archive("sss1.sss", &compressed);
    ws.write_archive("sss2.sss", &build_smkf(&frames(2)));
    let rasterizer = MockRasterizer::always_succeeds();

    let summary = SpriteExtractor::new(&ws.config, &Corrupt, &rasterizer)
        .run(&|_| {})
        .unwrap();

    assert_eq!(summary.skipped_count(), 2);
    assert!(matches!(
        &summary.characters[0].outcome,
        CharacterOutcome::Skipped(SkipReason::MissingInput(path)) if path.ends_with("sss0.sss")
    ));
    assert!(matches!(
        &summary.characters[1].outcome,
        CharacterOutcome::Skipped(SkipReason::DecompressionFailed(message)) if message.contains("bad block header")
    ));
    assert_eq!(summary.characters[2].extracted_count(), 2);
}

#[test]
fn test_yj1_archive_goes_through_decompressor() {
    let ws = Workspace::new(&[("sss3.sss", "anuanu")]);
    let mut compressed = b"YJ_1".to_vec();
    compressed.extend_from_slice(&build_smkf(&frames(4)));
    ws.write_archive("sss3.sss", &compressed);
    let rasterizer = MockRasterizer::always_succeeds();

    let summary = SpriteExtractor::new(&ws.config, &StripMarker, &rasterizer)
        .run(&|_| {})
        .unwrap();

    assert!(matches!(
        summary.characters[0].outcome,
        CharacterOutcome::Extracted { compression: Compression::Yj1, frames_found: 4, .. }
    ));
    assert_eq!(summary.extracted_count(), 4);
}

#[test]
fn test_representative_copied_from_64x96_frame_zero() {
    let ws = Workspace::new(&[("sss0.sss", "xiaoyao")]);
    ws.write_archive("sss0.sss", &build_smkf(&frames(2)));
    let rasterizer = MockRasterizer::accepting(&[FrameSize::new(64, 96)]);

    let summary = SpriteExtractor::new(&ws.config, &Echo, &rasterizer)
        .run(&|_| {})
        .unwrap();

    let frames = frame_reports(&summary.characters[0]);
    assert_eq!(frames[0].attempts.len(), 2);
    assert_eq!(
        frames[0].extracted.as_ref().map(|e| e.path.clone()),
        Some(ws.output("xiaoyao_frame0_64x96.png"))
    );
    assert_eq!(fs::read(ws.output("xiaoyao.png")).unwrap(), vec![0xAB; 600]);
}

#[test]
fn test_progress_covers_every_character() {
    let ws = Workspace::new(&[("sss0.sss", "xiaoyao"), ("sss1.sss", "linger")]);
    ws.write_archive("sss1.sss", &build_smkf(&frames(1)));
    let rasterizer = MockRasterizer::always_succeeds();

    let done = RefCell::new(Vec::new());
    SpriteExtractor::new(&ws.config, &Echo, &rasterizer)
        .run(&|p| {
            if p.phase == ExtractPhase::Done {
                done.borrow_mut().push((p.current, p.total, p.label.clone()));
            }
        })
        .unwrap();

    assert_eq!(
        done.into_inner(),
        vec![
            (1, 2, "xiaoyao".to_string()),
            (2, 2, "linger".to_string()),
        ]
    );
}

#[test]
fn test_builtin_rasterizer_end_to_end() {
    let mut ws = Workspace::new(&[("sss0.sss", "xiaoyao")]);
    ws.config.rasterizer = RasterizerKind::Builtin;

    let palette: Vec<u8> = (0..768).map(|i| ((i * 7) % 64) as u8).collect();
    fs::write(ws.config.palette_path(), build_mkf(&[palette])).unwrap();

    // Literal packets of pseudo-random indices, enough to cover 48x72
    let mut seed = 12345u32;
    let mut frame = Vec::new();
    for _ in 0..28 {
        frame.push(0x7F);
        for _ in 0..128 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            frame.push((seed >> 16) as u8);
        }
    }
    if frame.len() % 2 == 1 {
        frame.push(0);
    }
    ws.write_archive("sss0.sss", &build_smkf(&[frame]));

    let decompressor = ws.config.build_decompressor().unwrap();
    let rasterizer = ws.config.build_rasterizer();
    let summary = SpriteExtractor::new(&ws.config, decompressor.as_ref(), rasterizer.as_ref())
        .run(&|_| {})
        .unwrap();

    assert_eq!(summary.extracted_count(), 1);
    let written = ws.output("xiaoyao_frame0_48x72.png");
    let image = image_dimensions(&written);
    assert_eq!(image, (48, 72));
}

fn image_dimensions(path: &Path) -> (u32, u32) {
    let data = fs::read(path).unwrap();
    assert_eq!(&data[..8], b"\x89PNG\r\n\x1a\n");
    let width = u32::from_be_bytes(data[16..20].try_into().unwrap());
    let height = u32::from_be_bytes(data[20..24].try_into().unwrap());
    (width, height)
}

#[cfg(unix)]
#[test]
fn test_output_from_earlier_run_not_counted() {
    let ws = Workspace::new(&[("sss0.sss", "xiaoyao")]);
    ws.write_archive("sss0.sss", &build_smkf(&frames(1)));
    fs::create_dir_all(&ws.config.output_dir).unwrap();
    let stale = ws.output("xiaoyao_frame0_48x72.png");
    fs::write(&stale, vec![0u8; 600]).unwrap();

    // Exits cleanly without writing anything
    let script = ws.config.input_dir.join("noop.sh");
    fs::write(&script, "exit 0\n").unwrap();
    let rasterizer = ScriptRasterizer::new("sh", script);

    let summary = SpriteExtractor::new(&ws.config, &Echo, &rasterizer)
        .run(&|_| {})
        .unwrap();

    assert_eq!(summary.extracted_count(), 0);
    assert!(!stale.exists());
}

#[test]
fn test_unreadable_output_dir_fails_run() {
    let ws = Workspace::new(&[("sss0.sss", "xiaoyao")]);
    // A file where the output directory should be
    fs::create_dir_all(ws.config.output_dir.parent().unwrap()).unwrap();
    fs::write(&ws.config.output_dir, b"not a directory").unwrap();

    let result = SpriteExtractor::new(&ws.config, &Echo, &MockRasterizer::always_succeeds())
        .run(&|_| {});
    assert!(result.is_err());
}

#[test]
fn test_unpack_mkf_round_trip() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("ABC.MKF");
    fs::write(&source, build_mkf(&[b"first".to_vec(), Vec::new(), b"third".to_vec()])).unwrap();

    let written = palkit::formats::unpack_mkf(&source, dir.path().join("abc"), "abc", "yj1").unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(fs::read(dir.path().join("abc/abc0.yj1")).unwrap(), b"first");
    assert_eq!(fs::read(dir.path().join("abc/abc2.yj1")).unwrap(), b"third");
}
