use clap::{arg, crate_version, Command};
use retrocompressor::{compress, decompress};

const RCH: &str = "unreachable was reached";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let long_help = "Examples:
---------
Compress:      `retrocompressor compress -i my_file -o my_file.rcz`
Decompress:    `retrocompressor decompress -i my_file.rcz -o my_file`";

    let mut main_cmd = Command::new("retrocompressor")
        .about("Compress and decompress with the retrocompressor format")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(
        Command::new("compress")
            .arg(arg!(-i --input <PATH> "input path").required(true))
            .arg(arg!(-o --output <PATH> "output path").required(true))
            .about("compress a file"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("decompress")
            .arg(arg!(-i --input <PATH> "input path").required(true))
            .arg(arg!(-o --output <PATH> "output path").required(true))
            .about("decompress a file"),
    );

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let dat = std::fs::read(path_in)?;
        let compressed = compress(&dat)?;
        std::fs::write(path_out, compressed)?;
    }

    if let Some(cmd) = matches.subcommand_matches("decompress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let dat = std::fs::read(path_in)?;
        let expanded = decompress(&dat)?;
        std::fs::write(path_out, expanded)?;
    }

    Ok(())
}
