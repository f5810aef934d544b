use tracing::debug;

pub fn install_interrupt_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        debug!("interrupt received while a command was running");
    })
}
