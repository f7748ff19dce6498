use common::config::ServerConfig;
use server::Server;

/// Entry point.
///
/// Reads the command file named by the first positional argument and writes
/// results to the second; the operation log appends to `horadrimLog.csv`
/// unless overridden.
fn main() {
    let config = ServerConfig::from_command_line();
    let mut server = Server::new(config);
    if let Err(e) = server.run() {
        eprintln!("fatal: {}", e);
        std::process::exit(1);
    }
}
