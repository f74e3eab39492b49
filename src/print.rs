use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

use crate::difference::Difference;
use crate::domain::PlayerId;
use crate::optimizer::{OptimizationResult, Stage, Trial};
use crate::surface::Surface;

pub fn tabulate_difference(player: PlayerId, difference: &Difference) -> Table {
    Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(16))),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec![format!("{player}").into(), "m²".into()],
        ))
        .with_row(Row::new(
            Styles::default(),
            vec!["Space created".into(), format!("{:.1}", difference.space_created).into()],
        ))
        .with_row(Row::new(
            Styles::default(),
            vec!["Gained".into(), format!("{:.1}", difference.gained()).into()],
        ))
        .with_row(Row::new(
            Styles::default(),
            vec!["Conceded".into(), format!("{:.1}", difference.conceded()).into()],
        ))
}

/// Renders a surface as a character map, one cell per character, with the first row at the bottom
/// so that the table reads like a pitch viewed from above.
pub fn tabulate_surface(surface: &Surface) -> Table {
    const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];
    let mut table = Table::default().with_cols(vec![Col::new(Styles::default())]);
    for row in (0..surface.rows()).rev() {
        let line: String = surface
            .row_slice(row)
            .iter()
            .map(|&value| {
                let shade = (value.clamp(0.0, 1.0) * (SHADES.len() - 1) as f64).round() as usize;
                SHADES[shade]
            })
            .collect();
        table.push_row(Row::new(Styles::default(), vec![line.into()]));
    }
    table
}

/// The best `limit` trials of an optimisation, highest first, preceded by the recorded state.
pub fn tabulate_trials(result: &OptimizationResult, limit: usize) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(16)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(16)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec![
                "Stage".into(),
                "Position".into(),
                "Velocity".into(),
                "Speed".into(),
                "Created m²".into(),
            ],
        ))
        .with_row(Row::new(
            Styles::default().with(Separator(true)),
            vec![
                "recorded".into(),
                format!("{}", result.baseline.position).into(),
                format!("{}", result.baseline.velocity).into(),
                format!("{:.2}", result.baseline.speed()).into(),
                format!("{:.1}", 0.0).into(),
            ],
        ));

    let mut ranked: Vec<&Trial> = result.history.iter().collect();
    ranked.sort_by(|a, b| b.space_created.total_cmp(&a.space_created));
    for trial in ranked.into_iter().take(limit) {
        let stage = match trial.stage {
            Stage::Location => "location",
            Stage::Velocity => "velocity",
        };
        table.push_row(Row::new(
            Styles::default(),
            vec![
                stage.into(),
                format!("{}", trial.position).into(),
                format!("{}", trial.velocity).into(),
                format!("{:.2}", trial.velocity.norm()).into(),
                format!("{:.1}", trial.space_created).into(),
            ],
        ));
    }
    table
}
