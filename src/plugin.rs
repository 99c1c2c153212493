use crate::game::Position;
use crate::oracle::{Evaluation, Oracle};
use libloading::{Library, Symbol};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// FFI-safe form of an [`Evaluation`]: `kind` is 1 for a win, -1 for a loss
/// and 0 for a draw
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvaluation {
    pub kind: i8,
    pub distance: u32,
}

impl From<Evaluation> for RawEvaluation {
    fn from(evaluation: Evaluation) -> Self {
        match evaluation {
            Evaluation::Win(distance) => RawEvaluation { kind: 1, distance },
            Evaluation::Loss(distance) => RawEvaluation { kind: -1, distance },
            Evaluation::Draw => RawEvaluation { kind: 0, distance: 0 },
        }
    }
}

impl From<RawEvaluation> for Evaluation {
    fn from(raw: RawEvaluation) -> Self {
        match raw.kind {
            k if k > 0 => Evaluation::Win(raw.distance),
            k if k < 0 => Evaluation::Loss(raw.distance),
            _ => Evaluation::Draw,
        }
    }
}

/// FFI-safe representation of an oracle plugin
/// This is the interface used to load oracles from dynamic libraries
#[repr(C)]
pub struct OraclePlugin {
    pub oracle_ptr: *mut (),
    pub vtable: OracleVTable,
}

/// Virtual table for oracle operations
#[repr(C)]
pub struct OracleVTable {
    /// Copy up to `len` bytes of the name into the buffer, return the full length
    pub name: unsafe extern "C" fn(*mut (), *mut u8, usize) -> usize,
    pub lookup: unsafe extern "C" fn(*mut (), *const Position) -> RawEvaluation,
    pub drop: unsafe extern "C" fn(*mut ()),
}

/// Type signature for the plugin creation function
/// Every plugin library must export a function with this signature
pub type CreateOracleFn = unsafe extern "C" fn() -> *mut OraclePlugin;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("failed to load library: {0}")]
    Load(#[source] libloading::Error),
    #[error("failed to find create_oracle function: {0}")]
    Symbol(#[source] libloading::Error),
    #[error("create_oracle returned null")]
    Null,
}

/// Wrapper that runs an oracle from a dynamic library
pub struct PluginOracle {
    plugin: Box<OraclePlugin>,
    name: String,
    _library: Option<Library>, // Keep library alive
}

impl PluginOracle {
    /// Load an oracle plugin from a dynamic library file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PluginError> {
        unsafe {
            let library = Library::new(path.as_ref()).map_err(PluginError::Load)?;

            let create_oracle: Symbol<CreateOracleFn> =
                library.get(b"create_oracle").map_err(PluginError::Symbol)?;

            let plugin_ptr = create_oracle();
            let oracle = Self::from_raw(plugin_ptr, Some(library))?;
            info!(path = %path.as_ref().display(), name = %oracle.name, "loaded oracle plugin");
            Ok(oracle)
        }
    }

    /// Take ownership of a plugin created by `create_oracle`.
    ///
    /// # Safety
    /// `plugin_ptr` must be null or come from a `create_oracle` built by
    /// [`export_oracle!`](crate::export_oracle), and `library` must be the
    /// library it came from, if any.
    pub(crate) unsafe fn from_raw(
        plugin_ptr: *mut OraclePlugin,
        library: Option<Library>,
    ) -> Result<Self, PluginError> {
        if plugin_ptr.is_null() {
            return Err(PluginError::Null);
        }

        let plugin = unsafe { Box::from_raw(plugin_ptr) };

        let mut buf = [0u8; 64];
        let len = unsafe { (plugin.vtable.name)(plugin.oracle_ptr, buf.as_mut_ptr(), buf.len()) };
        let name = String::from_utf8_lossy(&buf[..len.min(buf.len())]).into_owned();

        Ok(PluginOracle {
            plugin,
            name,
            _library: library,
        })
    }
}

impl Oracle for PluginOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&mut self, position: &Position) -> Evaluation {
        unsafe { (self.plugin.vtable.lookup)(self.plugin.oracle_ptr, position as *const Position) }
            .into()
    }
}

impl Drop for PluginOracle {
    fn drop(&mut self) {
        unsafe {
            (self.plugin.vtable.drop)(self.plugin.oracle_ptr);
        }
    }
}

unsafe impl Send for PluginOracle {}

/// Helper macro for implementing an oracle plugin
/// This handles all the FFI boilerplate
#[macro_export]
macro_rules! export_oracle {
    ($oracle_type:ty) => {
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn create_oracle() -> *mut $crate::plugin::OraclePlugin {
            let oracle = Box::new(<$oracle_type>::default());
            let oracle_ptr = Box::into_raw(oracle) as *mut ();

            let vtable = $crate::plugin::OracleVTable {
                name: oracle_name,
                lookup: oracle_lookup,
                drop: oracle_drop,
            };

            Box::into_raw(Box::new($crate::plugin::OraclePlugin { oracle_ptr, vtable }))
        }

        unsafe extern "C" fn oracle_name(ptr: *mut (), buf: *mut u8, len: usize) -> usize {
            let oracle = unsafe { &*(ptr as *const $oracle_type) };
            let name = $crate::oracle::Oracle::name(oracle).as_bytes();
            unsafe { std::ptr::copy_nonoverlapping(name.as_ptr(), buf, name.len().min(len)) };
            name.len()
        }

        unsafe extern "C" fn oracle_lookup(
            ptr: *mut (),
            position: *const $crate::game::Position,
        ) -> $crate::plugin::RawEvaluation {
            let oracle = unsafe { &mut *(ptr as *mut $oracle_type) };
            let position = unsafe { &*position };
            $crate::oracle::Oracle::lookup(oracle, position).into()
        }

        unsafe extern "C" fn oracle_drop(ptr: *mut ()) {
            let _ = unsafe { Box::from_raw(ptr as *mut $oracle_type) };
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::SearchOracle;

    /// Search oracle at depth one, exported the way a plugin library would
    struct ShallowOracle(SearchOracle);

    impl Default for ShallowOracle {
        fn default() -> Self {
            ShallowOracle(SearchOracle::new(1))
        }
    }

    impl Oracle for ShallowOracle {
        fn name(&self) -> &str {
            "shallow"
        }

        fn lookup(&mut self, position: &Position) -> Evaluation {
            self.0.lookup(position)
        }
    }

    crate::export_oracle!(ShallowOracle);

    #[test]
    fn test_raw_evaluation_conversion() {
        for evaluation in [Evaluation::Win(3), Evaluation::Loss(2), Evaluation::Draw] {
            let raw = RawEvaluation::from(evaluation);
            assert_eq!(Evaluation::from(raw), evaluation);
        }
        assert_eq!(
            Evaluation::from(RawEvaluation { kind: 0, distance: 9 }),
            Evaluation::Draw
        );
    }

    #[test]
    fn test_exported_oracle_through_vtable() {
        let mut oracle = unsafe { PluginOracle::from_raw(create_oracle(), None) }.unwrap();

        assert_eq!(oracle.name(), "shallow");

        let position = Position::parse("S/g--/-l-/-G-/E-L/-").unwrap();
        assert_eq!(oracle.lookup(&position), Evaluation::Win(1));
        assert_eq!(oracle.lookup(&Position::initial()), Evaluation::Draw);
    }

    #[test]
    fn test_null_plugin_is_rejected() {
        let result = unsafe { PluginOracle::from_raw(std::ptr::null_mut(), None) };
        assert!(matches!(result, Err(PluginError::Null)));
    }

    #[test]
    fn test_missing_library_fails_to_load() {
        let result = PluginOracle::load("/nonexistent/libno_such_oracle.so");
        assert!(matches!(result, Err(PluginError::Load(_))));
    }
}
