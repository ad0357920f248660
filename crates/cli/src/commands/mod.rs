pub mod adjust;
pub mod read;
pub mod read_dir;

pub const EXIT_OK: u8 = 0;
/// A read or decode failed.
pub const EXIT_FAILURE: u8 = 1;
/// The input file does not exist.
pub const EXIT_NOT_FOUND: u8 = 9;

const LOGO: &str = "
####################################################
### ssq: DDR SSQ/CSQ chart chunk analyze tool    ###
####################################################
";

pub fn print_logo(nologo: bool) {
    if !nologo {
        println!("{}", LOGO);
    }
}
