fn main() -> std::process::ExitCode {
    implscope_cli::run()
}
