use super::{ColorArg, ColorCapability};

pub(super) fn detect_color_capability_from(
    mode: ColorArg,
    term: Option<&str>,
    colorterm: Option<&str>,
    no_color: Option<&str>,
) -> ColorCapability {
    let term = term.unwrap_or_default().to_lowercase();
    let colorterm = colorterm.unwrap_or_default().to_lowercase();
    let no_color = no_color.is_some_and(|value| !value.is_empty());

    match mode {
        ColorArg::Never => return ColorCapability::Basic16,
        ColorArg::Auto if no_color || term == "dumb" => return ColorCapability::Basic16,
        ColorArg::Auto | ColorArg::Always => {}
    }
    if truecolor_hint(&colorterm) || truecolor_hint(&term) {
        ColorCapability::TrueColor
    } else if term.contains("256color") {
        ColorCapability::Xterm256
    } else if mode == ColorArg::Always {
        // Forced colour on an unknown terminal still gets the cube.
        ColorCapability::Xterm256
    } else {
        ColorCapability::Basic16
    }
}

fn truecolor_hint(value: &str) -> bool {
    value.contains("truecolor") || value.contains("24bit") || value.ends_with("direct")
}
