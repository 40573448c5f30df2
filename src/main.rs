/*!
 * File Descriptor Kernel - Main Entry Point
 *
 * Boots the descriptor layer on an in-memory filesystem:
 * - Console device for the standard streams
 * - Process 1 with descriptors 0, 1, 2
 * - A short open / write / seek / dup2 / close session
 */

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use fdtable_kernel::core::limits::CONSOLE_PATH;
use fdtable_kernel::vfs::{O_CREAT, O_RDWR};
use fdtable_kernel::{
    init_tracing, FdManager, FileDescriptorHandler, FileTableConfig, KernelError, MemFS,
    ResourceOrchestrator, Syscall, SyscallHandler, SyscallHandlerRegistry, Whence,
};

const INIT_PID: u32 = 1;

fn main() -> miette::Result<()> {
    init_tracing();

    info!("File descriptor kernel starting...");

    let config = FileTableConfig::load()?;
    let fs = MemFS::new();
    let console = fs.install_console(CONSOLE_PATH).map_err(KernelError::from)?;
    console.push_input(b"hello from the console\n");
    info!(path = CONSOLE_PATH, "Console device installed");

    let fds = FdManager::new(Arc::new(fs.clone()), config)?;
    fds.create_process_table(INIT_PID, CONSOLE_PATH, CONSOLE_PATH, CONSOLE_PATH)
        .map_err(KernelError::from)?;

    let handler = Arc::new(FileDescriptorHandler::new(fds.clone()));
    let registry = SyscallHandlerRegistry::new().register(handler.clone());
    info!(handler = handler.name(), handlers = registry.handler_count(), "Syscall handlers registered");

    let session = [
        Syscall::Open {
            path: Some(PathBuf::from("A")),
            flags: O_RDWR | O_CREAT,
            mode: 0o644,
        },
        Syscall::Write {
            fd: 3,
            data: b"0123456789".to_vec(),
        },
        Syscall::Lseek {
            fd: 3,
            offset: 0,
            whence: Whence::SEEK_CUR,
        },
        Syscall::Dup2 { oldfd: 3, newfd: 1 },
        Syscall::Write {
            fd: 1,
            data: b"!".to_vec(),
        },
        Syscall::Read { fd: 0, len: 64 },
        Syscall::Close { fd: 3 },
    ];

    for call in &session {
        let Some(result) = registry.dispatch(INIT_PID, call) else {
            error!(syscall = call.name(), "No handler accepted syscall");
            continue;
        };
        info!(
            syscall = call.name(),
            retval = result.retval(),
            errno = result.errno(),
            "syscall returned"
        );
    }

    info!(
        open_files = fds.open_file_count(),
        descriptors = fds.descriptor_count(INIT_PID).unwrap_or(0),
        contents = %String::from_utf8_lossy(&fs.read("A").map_err(KernelError::from)?),
        "Session finished"
    );

    let orchestrator = ResourceOrchestrator::new().register(Arc::new(fds.clone()));
    let cleanup = orchestrator.cleanup_process(INIT_PID);
    info!("{}", cleanup);
    info!(
        open_files = fds.open_file_count(),
        console_output = %String::from_utf8_lossy(&console.take_output()),
        "Kernel shut down"
    );

    Ok(())
}
