//! Choco Runtime
//!
//! Reference executor for compiled modules. It links a module against the
//! standard host functions (`print_num`, `print_bool`, `print_none`, `abs`,
//! `min`, `max`, `pow`, `check_init`), provides its memory and runs the
//! exported entry function.

pub mod config;
pub mod error;
pub mod host;
pub mod link;
pub mod machine;
pub mod memory;

pub use config::{ConfigError, RuntimeConfig};
pub use error::{LinkError, RuntimeError, RuntimeResult, Trap};
pub use host::{CapturingHost, Host, HostFunction, StdoutHost};
pub use link::{link, LinkedModule};

use choco_compiler::ir::Module;
use machine::Machine;

/// Runs modules against a host
pub struct Runtime<H: Host> {
    config: RuntimeConfig,
    host: H,
}

impl<H: Host> Runtime<H> {
    pub fn new(config: RuntimeConfig, host: H) -> Self {
        Self { config, host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Link and run `module`, returning the entry function's result when
    /// the export declares one
    pub fn run(&mut self, module: &Module) -> RuntimeResult<Option<i32>> {
        let linked = link(module)?;
        self.run_linked(&linked)
    }

    pub fn run_linked(&mut self, module: &LinkedModule) -> RuntimeResult<Option<i32>> {
        let _span = tracing::debug_span!("run").entered();

        let pages = module.memory_pages.max(self.config.memory_pages);
        if pages > self.config.max_memory_pages {
            return Err(LinkError::MemoryTooLarge {
                required: pages,
                limit: self.config.max_memory_pages,
            }
            .into());
        }

        let mut machine = Machine::new(
            module,
            memory::Memory::new(pages),
            &mut self.host,
            self.config.max_call_depth,
        );
        let result = machine.invoke(module.entry, &[]).map_err(|trap| {
            tracing::debug!(%trap, "execution trapped");
            trap
        })?;
        Ok(result.filter(|_| module.entry_has_result))
    }
}

impl Default for Runtime<CapturingHost> {
    fn default() -> Self {
        Self::new(RuntimeConfig::default(), CapturingHost::new())
    }
}

/// Compile and run `source`, collecting printed lines
pub fn run_source(source: &str) -> Result<Execution, choco_compiler::CompileError> {
    let module = choco_compiler::compile(source)?;
    let mut runtime = Runtime::default();
    let result = runtime.run(&module);
    Ok(Execution {
        output: runtime.into_host().into_lines(),
        result,
    })
}

/// Outcome of [`run_source`]
#[derive(Debug)]
pub struct Execution {
    pub output: Vec<String>,
    pub result: RuntimeResult<Option<i32>>,
}
