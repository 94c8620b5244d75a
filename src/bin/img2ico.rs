use clap::{App, Arg};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process;

//===========================================================================//

fn main() {
    env_logger::init();
    let matches = App::new("img2ico")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Converts an image to a multi-resolution ICO file")
        .arg(
            Arg::with_name("input")
                .value_name("INPUT")
                .required(true)
                .help("Path to the input image file"),
        )
        .arg(Arg::with_name("output").value_name("OUTPUT").help(
            "Path to the output .ico file (defaults to the input \
             path with an .ico extension)",
        ))
        .arg(
            Arg::with_name("sizes")
                .takes_value(true)
                .value_name("SIZES")
                .short("s")
                .long("sizes")
                .help(
                    "Comma-separated list of icon sizes, e.g. \
                     \"16,24,32,48,64,96,128,256\"",
                ),
        )
        .get_matches();
    let input = PathBuf::from(matches.value_of("input").unwrap());
    let output = matches.value_of("output");
    let sizes = matches.value_of("sizes");
    if let Err(message) = run(&input, output, sizes) {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn run(
    input: &Path,
    output: Option<&str>,
    sizes: Option<&str>,
) -> Result<(), String> {
    // A bad size list is rejected before any file is touched.
    let sizes = match sizes {
        Some(list) => parse_sizes(list)?,
        None => img2ico::DEFAULT_SIZES.to_vec(),
    };
    let bytes = fs::read(input).map_err(|error| {
        if error.kind() == ErrorKind::NotFound {
            format!("input file not found: {}", input.display())
        } else {
            format!("failed to read {}: {}", input.display(), error)
        }
    })?;
    let result = img2ico::convert(&bytes, &img2ico::IcoOptions { sizes })
        .map_err(|error| error.to_string())?;
    let output = output_path(input, output);
    fs::write(&output, result.as_bytes()).map_err(|error| {
        format!("failed to write {}: {}", output.display(), error)
    })?;
    println!(
        "Wrote {} ({} bytes, sizes {:?})",
        output.display(),
        result.len(),
        result.sizes()
    );
    Ok(())
}

fn parse_sizes(list: &str) -> Result<Vec<u32>, String> {
    list.split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<u32>().map_err(|_| {
                format!("invalid size \"{}\" in sizes list", token)
            })
        })
        .collect()
}

fn output_path(input: &Path, output: Option<&str>) -> PathBuf {
    let path = match output {
        Some(path) => PathBuf::from(path),
        None => input.with_extension("ico"),
    };
    let has_ico_extension = path
        .extension()
        .map_or(false, |extension| extension.eq_ignore_ascii_case("ico"));
    if has_ico_extension {
        path
    } else {
        let mut with_suffix = path.into_os_string();
        with_suffix.push(".ico");
        PathBuf::from(with_suffix)
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{output_path, parse_sizes};
    use std::path::{Path, PathBuf};

    #[test]
    fn parse_well_formed_sizes() {
        assert_eq!(parse_sizes("16,32,48").unwrap(), vec![16, 32, 48]);
        assert_eq!(parse_sizes(" 16 , 32 ").unwrap(), vec![16, 32]);
        assert_eq!(parse_sizes("256").unwrap(), vec![256]);
    }

    #[test]
    fn parse_rejects_non_numeric_tokens() {
        assert!(parse_sizes("16,foo,32").is_err());
        assert!(parse_sizes("").is_err());
        assert!(parse_sizes("16,,32").is_err());
        assert!(parse_sizes("-16").is_err());
    }

    #[test]
    fn output_defaults_to_input_with_ico_extension() {
        assert_eq!(
            output_path(Path::new("art/logo.png"), None),
            PathBuf::from("art/logo.ico")
        );
        assert_eq!(
            output_path(Path::new("logo"), None),
            PathBuf::from("logo.ico")
        );
    }

    #[test]
    fn supplied_output_gets_ico_extension_appended() {
        assert_eq!(
            output_path(Path::new("in.png"), Some("out")),
            PathBuf::from("out.ico")
        );
        assert_eq!(
            output_path(Path::new("in.png"), Some("out.png")),
            PathBuf::from("out.png.ico")
        );
        assert_eq!(
            output_path(Path::new("in.png"), Some("out.ico")),
            PathBuf::from("out.ico")
        );
        assert_eq!(
            output_path(Path::new("in.png"), Some("out.ICO")),
            PathBuf::from("out.ICO")
        );
    }
}

//===========================================================================//
