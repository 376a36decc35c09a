fn main() {
  if let Err(e) = gymrat_log_lib::run() {
    eprintln!("Error: {}", e);
    std::process::exit(1);
  }
}
