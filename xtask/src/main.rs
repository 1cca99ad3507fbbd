/// The xtask binary delegates entirely to nih_plug_xtask, which provides
/// the `bundle` subcommand. Usage:
///
///   cargo xtask bundle dome-live --release
///
/// This compiles the plugin as a cdylib and packages it into
/// `target/bundled/Dome Live.vst3` and `target/bundled/Dome Live.clap`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
