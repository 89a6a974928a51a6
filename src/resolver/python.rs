/// Module loader backed by the host Python interpreter
///
/// Each request runs a short probe script in a fresh interpreter process. The
/// probe silences `sys.stdout` while the library is imported, so anything a
/// library prints during initialisation cannot end up in the reply, and writes
/// a single JSON line back.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::{LoadError, LoadedModule, ModuleLoader};
use crate::interpreter::{parse_last_json_line, PythonInterpreter};

const PROBE_SCRIPT: &str = r#"
import importlib
import importlib.machinery
import importlib.util
import inspect
import json
import os
import sys


def _source(module):
    for getter in (inspect.getsourcefile, inspect.getfile):
        try:
            path = getter(module)
        except TypeError:
            path = None
        if path:
            return os.path.abspath(path)
    path = getattr(module, '__file__', None)
    return os.path.abspath(path) if path else None


def _load(mode, target, extra):
    if mode == 'file':
        loader = importlib.machinery.SourceFileLoader(target, extra)
        spec = importlib.util.spec_from_file_location(target, extra, loader=loader)
        if spec is None or spec.loader is None:
            raise ImportError('No module loader for %s' % extra)
        module = importlib.util.module_from_spec(spec)
        sys.modules[target] = module
        spec.loader.exec_module(module)
        return module
    return importlib.import_module(target)


def _main():
    mode, target, extra = sys.argv[1:4]
    sys.dont_write_bytecode = True
    out = sys.stdout
    sys.stdout = open(os.devnull, 'w')
    try:
        module = _load(mode, target, extra)
        reply = {'ok': True, 'source': _source(module)}
        if mode == 'attr':
            reply['present'] = hasattr(module, extra)
    except BaseException as exc:
        reply = {'ok': False, 'error': str(exc) or type(exc).__name__}
    sys.stdout = out
    out.write('\n' + json.dumps(reply) + '\n')


_main()
"#;

#[derive(Debug, Clone, Copy)]
enum ProbeMode {
    File,
    Import,
    Attribute,
}

impl ProbeMode {
    fn as_str(self) -> &'static str {
        match self {
            ProbeMode::File => "file",
            ProbeMode::Import => "import",
            ProbeMode::Attribute => "attr",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeReply {
    ok: bool,
    #[serde(default)]
    source: Option<PathBuf>,
    #[serde(default)]
    present: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

pub struct PythonLoader {
    interpreter: PythonInterpreter,
}

impl PythonLoader {
    pub fn new(interpreter: PythonInterpreter) -> Self {
        Self { interpreter }
    }

    fn probe(&self, mode: ProbeMode, target: &str, extra: &str) -> Result<ProbeReply, LoadError> {
        let output = self
            .interpreter
            .run_script(PROBE_SCRIPT, &[mode.as_str(), target, extra])
            .map_err(|e| LoadError::Host(format!("{:#}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reply = parse_reply(&stdout).ok_or_else(|| {
            let stderr = String::from_utf8_lossy(&output.stderr);
            LoadError::Host(format!(
                "probe exited with {} without a reply: {}",
                output.status,
                stderr.trim()
            ))
        })?;

        tracing::trace!(mode = mode.as_str(), module = target, ok = reply.ok, "probe finished");

        if reply.ok {
            Ok(reply)
        } else {
            Err(LoadError::Import(
                reply.error.unwrap_or_else(|| "unknown import error".to_string()),
            ))
        }
    }
}

fn parse_reply(stdout: &str) -> Option<ProbeReply> {
    parse_last_json_line(stdout)
}

impl ModuleLoader for PythonLoader {
    fn load_file(&self, name: &str, path: &Path) -> Result<LoadedModule, LoadError> {
        let path_arg = path.to_string_lossy();
        let reply = self.probe(ProbeMode::File, name, &path_arg)?;

        Ok(LoadedModule {
            import_name: name.to_string(),
            source: reply.source,
        })
    }

    fn import(&self, dotted: &str) -> Result<LoadedModule, LoadError> {
        let reply = self.probe(ProbeMode::Import, dotted, "")?;

        Ok(LoadedModule {
            import_name: dotted.to_string(),
            source: reply.source,
        })
    }

    fn has_attribute(&self, module: &LoadedModule, attribute: &str) -> Result<bool, LoadError> {
        let reply = self.probe(ProbeMode::Attribute, &module.import_name, attribute)?;
        Ok(reply.present.unwrap_or(false))
    }
}
