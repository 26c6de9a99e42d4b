//! Score chart for a recommendation run.

use anyhow::Result;
use peptofit_core::scoring::component_weight;
use peptofit_schemas::recommendation::{Recommendation, ScoreComponent};
use plotters::prelude::*;
use std::path::Path;

const BAR_HALF_WIDTH: f64 = 0.35;

/// Stacked bars of the weighted sub-scores per recommendation, with the final overall score
/// (pathway bonus included) marked on top. Saved as `scores.png`.
pub fn plot_scores(output_dir: &Path, title: &str, recommendations: &[Recommendation]) -> Result<()> {
    if recommendations.is_empty() {
        tracing::warn!("no recommendations to plot");
        return Ok(());
    }

    let path = output_dir.join("scores.png");
    let root = BitMapBackend::new(&path, (1280, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = recommendations.len();
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 36).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..1.05)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| {
            if (x - x.round()).abs() < 1e-6 && *x >= 0.0 {
                format!("#{}", x.round() as usize + 1)
            } else {
                String::new()
            }
        })
        .x_desc("Recommendation")
        .y_desc("Weighted score")
        .draw()?;

    let colors = [RED, GREEN, BLUE, MAGENTA];
    let mut bottoms = vec![0.0; n];
    for (component, color) in ScoreComponent::ALL.iter().zip(colors) {
        let weight = component_weight(*component);
        let bars: Vec<Rectangle<(f64, f64)>> = recommendations
            .iter()
            .zip(bottoms.iter_mut())
            .enumerate()
            .map(|(i, (rec, bottom))| {
                let top = *bottom + weight * rec.subscores.get(*component);
                let x = i as f64;
                let bar = Rectangle::new(
                    [(x - BAR_HALF_WIDTH, *bottom), (x + BAR_HALF_WIDTH, top)],
                    color.mix(0.8).filled(),
                );
                *bottom = top;
                bar
            })
            .collect();
        chart
            .draw_series(bars)?
            .label(component.key())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    chart
        .draw_series(
            recommendations
                .iter()
                .enumerate()
                .map(|(i, rec)| Circle::new((i as f64, rec.overall_score), 5, BLACK.filled())),
        )?
        .label("overall")
        .legend(|(x, y)| Circle::new((x + 7, y), 4, BLACK.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    tracing::info!(path = %path.display(), "score chart saved");
    Ok(())
}
