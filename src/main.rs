fn main() -> std::process::ExitCode {
    recital_lib::run()
}
