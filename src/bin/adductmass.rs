use std::sync::LazyLock;

use adduct::{Adduct, AdductResolver, Result};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use rust_decimal::Decimal;
use rustyline::DefaultEditor;

static RESOLVER: LazyLock<AdductResolver> = LazyLock::new(AdductResolver::default);

fn main() -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;
    while let Ok(adduct) = rl.readline("Adduct: ") {
        rl.add_history_entry(&adduct)?;
        match adduct_info(&adduct) {
            Ok(info) => print!("{info}"),
            Err(diagnostic) => render_error(diagnostic),
        }
    }
    Ok(())
}

fn adduct_info(text: &str) -> Result<String> {
    let adduct = Adduct::new(text)?;
    let resolved = RESOLVER.resolve_adduct(&adduct)?;

    let ions: Vec<_> = adduct.ions().iter().map(ToString::to_string).collect();
    let lines = [
        format!("Normalized: {adduct}"),
        format!("Charge: {}", adduct.charge()),
        format!("Parent Multiplier: {}", adduct.parent_multiplier().get()),
        format!("Ions: {}", ions.join(" ")),
        format!("Multiplier: {}", decimal_round_workaround(resolved.multiplier(), 6)),
        format!(
            "Correction Mass: {}",
            decimal_round_workaround(resolved.correction_mass(), 6)
        ),
    ];

    Ok(format!("{}\n\n", lines.join("\n")))
}

fn render_error(diagnostic: impl Into<Box<dyn Diagnostic + 'static>>) {
    let mut buf = String::new();
    let rendered = GraphicalReportHandler::new_themed(GraphicalTheme::unicode())
        .render_report(&mut buf, diagnostic.into().as_ref());
    match rendered {
        Ok(()) => println!("{buf}"),
        Err(_) => println!("failed to render the error report"),
    }
}

// FIXME: Really this should be fixed in `rust_decimal`...
fn decimal_round_workaround(value: Decimal, decimal_points: u32) -> String {
    let value = value.round_dp(decimal_points);
    format!("{value}")
}
