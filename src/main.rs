fn main() -> std::process::ExitCode {
    hembygd_lib::run()
}
