//! file: core/src/lower/debug_dump.rs
//! description: per-module debug output of the lowering pass.
//!
//! A `DebugSink` writes a header, the textual IR and one breakdown entry per
//! instruction to `<dir>/<module>.txt`. An existing file is never overwritten:
//! `_0` through `_99` suffixes are tried in turn. Any I/O failure is logged
//! and disables the sink; lowering itself is unaffected.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::sil::{InstKind, Instruction, MemoryBehavior, ReleasingBehavior, SilModule};

const MAX_SUFFIX: usize = 100;

/// Breakdown of one instruction, shared by the dump, the `print` option and
/// the CLI `inspect` table.
#[derive(Debug, Clone, PartialEq)]
pub struct InstBreakdown {
    pub function: String,
    pub block: String,
    pub index: usize,
    pub op: String,
    pub location: String,
    pub memory: Option<&'static str>,
    pub releasing: &'static str,
    pub operands: Vec<String>,
    pub arguments: Vec<String>,
}

impl InstBreakdown {
    pub fn new(module: &SilModule, function: &str, block: &str, index: usize, inst: &Instruction) -> Self {
        let location = match inst.loc.as_ref().and_then(|l| l.decode()) {
            Some(loc) => format!("{}, Line: {}, Col: {}", loc.short_file(), loc.line, loc.column),
            None => "unknown".to_string(),
        };
        let memory = match inst.kind.memory_behavior() {
            MemoryBehavior::None => None,
            MemoryBehavior::MayRead => Some("MEM-R"),
            MemoryBehavior::MayWrite => Some("MEM-W"),
            MemoryBehavior::MayReadWrite => Some("MEM-RW"),
            MemoryBehavior::MayHaveSideEffects => Some("EFF"),
        };
        let releasing = match inst.kind.releasing_behavior() {
            ReleasingBehavior::DoesNotRelease => "does not release",
            ReleasingBehavior::MayRelease => "may release",
        };
        let operands: Vec<String> = inst.operands.iter().map(|o| module.value_label(*o)).collect();
        let arguments = match inst.kind {
            InstKind::Apply | InstKind::BeginApply | InstKind::PartialApply | InstKind::TryApply { .. } => {
                operands.iter().skip(1).cloned().collect()
            }
            _ => Vec::new(),
        };
        InstBreakdown {
            function: function.to_string(),
            block: block.to_string(),
            index,
            op: inst.kind.name().to_string(),
            location,
            memory,
            releasing,
            operands,
            arguments,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![
            format!("[INSTRUCTION] {} / {} #{}: {}", self.function, self.block, self.index, self.op),
            format!("    Source: {}", self.location),
        ];
        if let Some(mem) = self.memory {
            out.push(format!("    [{}]", mem));
        }
        out.push(format!("    [REL]: {}", self.releasing));
        for (i, op) in self.operands.iter().enumerate() {
            out.push(format!("    Operand #{}: {}", i, op));
        }
        for arg in &self.arguments {
            out.push(format!("    Argument: {}", arg));
        }
        out
    }
}

#[derive(Debug, Default)]
pub struct DebugSink {
    file: Option<File>,
    path: Option<PathBuf>,
}

impl DebugSink {
    pub fn disabled() -> Self {
        DebugSink::default()
    }

    /// Opens a fresh dump file for `module` inside `dir`.
    pub fn open(dir: &Path, module: &SilModule) -> Self {
        let stem = module.dump_stem();
        let mut candidates = vec![dir.join(format!("{}.txt", stem))];
        candidates.extend((0..MAX_SUFFIX).map(|i| dir.join(format!("{}_{}.txt", stem, i))));

        for path in candidates {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    let mut sink = DebugSink { file: Some(file), path: Some(path) };
                    sink.write_header(module);
                    return sink;
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    log::warn!("debug dump disabled: cannot open {}: {}", path.display(), e);
                    return DebugSink::disabled();
                }
            }
        }
        log::warn!("debug dump disabled: no free file name for '{}' in {}", stem, dir.display());
        DebugSink::disabled()
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn write_line(&mut self, line: &str) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(file, "{}", line) {
            log::warn!("debug dump disabled: write failed: {}", e);
            self.file = None;
        }
    }

    pub fn write_breakdown(&mut self, entry: &InstBreakdown) {
        for line in entry.lines() {
            self.write_line(&line);
        }
    }

    fn write_header(&mut self, module: &SilModule) {
        let source = module.source_file.clone().unwrap_or_else(|| module.name.clone());
        self.write_line(&format!("[SOURCE] file: {}", source));
        self.write_line(&format!("[DUMPED] {}", Local::now().format("%Y-%m-%d %H:%M:%S")));
        self.write_line("");
        self.write_line(&module.to_string());
    }
}
