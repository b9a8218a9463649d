use clap::Parser;
use geigercore::interface::{PlateauAnalysis, SampleSet};
use geigercore::math::StatsHelper;
use geigercore::prelude::{
    AnalysisConfig, DEFAULT_INTERPOLATION_POINTS, DEFAULT_POLYORDER, DEFAULT_WINDOW_LENGTH,
};
use geigercore::processing::PlateauAnalyzer;
use iced::{
    mouse,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Task, Theme,
};
use std::path::PathBuf;

const PLATEAU_COLOR: Color = Color::from_rgb(1.0, 0.65, 0.0);
const BREAKDOWN_COLOR: Color = Color::from_rgb(0.9, 0.2, 0.2);
const OPERATING_COLOR: Color = Color::from_rgb(0.2, 0.8, 0.3);
const SAMPLE_COLOR: Color = Color::from_rgba(0.18, 0.72, 0.89, 0.6);
const CURVE_COLOR: Color = Color::from_rgb(0.95, 0.95, 0.95);

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Geiger plateau curve viewer")]
struct Args {
    /// CSV table with `V` (voltage) and `C` (count) columns
    data: PathBuf,
    #[arg(long)]
    start_threshold: f64,
    #[arg(long)]
    end_threshold: f64,
    #[arg(long, default_value_t = DEFAULT_INTERPOLATION_POINTS)]
    points: usize,
    #[arg(long, default_value_t = DEFAULT_WINDOW_LENGTH)]
    window: usize,
    #[arg(long, default_value_t = DEFAULT_POLYORDER)]
    polyorder: usize,
}

fn main() -> iced::Result {
    env_logger::init();
    let args = Args::parse();

    iced::application(
        move || Visualizer::boot(args.clone()),
        Visualizer::update,
        Visualizer::view,
    )
    .title(application_title)
    .theme(application_theme)
    .run()
}

fn application_title(state: &Visualizer) -> String {
    format!(
        "Geiger Counter Voltage-Count Curve with Smoothing - {}",
        state.data.display()
    )
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    data: PathBuf,
    config: ConfigForm,
    analysis: Option<PlateauAnalysis>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    ConfigFieldChanged(ConfigField, String),
    Rerun,
}

#[derive(Debug, Clone, Copy)]
enum ConfigField {
    StartThreshold,
    EndThreshold,
    Points,
    Window,
    Polyorder,
}

impl Visualizer {
    fn boot(args: Args) -> (Self, Task<Message>) {
        let mut state = Visualizer {
            data: args.data.clone(),
            config: ConfigForm::from_args(&args),
            analysis: None,
            status: "Loading calibration data...".into(),
            history: Vec::new(),
        };
        state.rerun();
        (state, Task::none())
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::ConfigFieldChanged(field, value) => {
                state.config.update_field(field, value);
            }
            Message::Rerun => state.rerun(),
        }
        Task::none()
    }

    fn rerun(&mut self) {
        let config = match self.config.to_config() {
            Ok(config) => config,
            Err(err) => {
                self.status = format!("Config error: {err}");
                return;
            }
        };

        let result = SampleSet::from_csv_path(&self.data)
            .and_then(|samples| PlateauAnalyzer::new(config).analyze(&samples));
        match result {
            Ok(analysis) => {
                self.status = analysis.summary_line();
                self.push_history(format!(
                    "{}/{} counts/V -> {:.2} V",
                    analysis.config.start_threshold,
                    analysis.config.end_threshold,
                    analysis.operating_voltage()
                ));
                self.analysis = Some(analysis);
            }
            Err(err) => {
                self.status = format!("Analysis error: {err}");
                self.analysis = None;
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let config_column = column![
            text("Analysis Config").size(26),
            text_input("Start threshold (counts/V)", &state.config.start_threshold)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::StartThreshold, value))
                .padding(6),
            text_input("End threshold (counts/V)", &state.config.end_threshold)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::EndThreshold, value))
                .padding(6),
            text_input("Interpolation points", &state.config.points)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::Points, value))
                .padding(6),
            text_input("Smoothing window", &state.config.window)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::Window, value))
                .padding(6),
            text_input("Polynomial order", &state.config.polyorder)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::Polyorder, value))
                .padding(6),
            button("Re-run analysis").on_press(Message::Rerun).padding(10),
            text(&state.status).size(14),
            column![
                text("Parameter definitions").size(16),
                text("Start threshold: slope below which the plateau begins.").size(12),
                text("End threshold: slope above which breakdown begins.").size(12),
                text("Interpolation points: resolution of the resampled curve.").size(12),
                text("Smoothing window / order: Savitzky-Golay filter settings.").size(12),
            ]
            .spacing(4)
            .padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(360.0));

        let boundaries = if let Some(analysis) = &state.analysis {
            let plateau = &analysis.plateau;
            column![
                text(format!("Plateau Start: {:.2} V", plateau.plateau_start_voltage))
                    .size(16)
                    .color(PLATEAU_COLOR),
                text(format!(
                    "Breakdown Start: {:.2} V",
                    plateau.breakdown_start_voltage
                ))
                .size(16)
                .color(BREAKDOWN_COLOR),
                text(format!("Operating Voltage: {:.2} V", plateau.operating_voltage))
                    .size(16)
                    .color(OPERATING_COLOR),
            ]
            .spacing(4)
        } else {
            column![text("No analysis available").size(16)]
        };

        let chart = Canvas::new(PlateauChart::new(state.analysis.as_ref()))
            .width(Length::Fill)
            .height(Length::Fixed(420.0));

        let notes_list = match &state.analysis {
            Some(analysis) if !analysis.notes.is_empty() => analysis
                .notes
                .iter()
                .fold(Column::new().spacing(4), |col, note| {
                    col.push(text(note.clone()).size(12))
                }),
            _ => Column::new().push(text("No notes yet").size(12)),
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let chart_column = column![
            text("Geiger Counter Voltage-Count Curve").size(26),
            text("Count (C) vs Voltage (V): dots are measured data, line is the smoothed interpolation")
                .size(12),
            chart,
            boundaries,
            text("Processing notes").size(16),
            Container::new(scrollable(notes_list).height(Length::Fixed(110.0))).padding(6),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![config_column, chart_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

#[derive(Debug, Clone)]
struct ConfigForm {
    start_threshold: String,
    end_threshold: String,
    points: String,
    window: String,
    polyorder: String,
}

impl ConfigForm {
    fn from_args(args: &Args) -> Self {
        Self {
            start_threshold: args.start_threshold.to_string(),
            end_threshold: args.end_threshold.to_string(),
            points: args.points.to_string(),
            window: args.window.to_string(),
            polyorder: args.polyorder.to_string(),
        }
    }

    fn update_field(&mut self, field: ConfigField, value: String) {
        match field {
            ConfigField::StartThreshold => self.start_threshold = value,
            ConfigField::EndThreshold => self.end_threshold = value,
            ConfigField::Points => self.points = value,
            ConfigField::Window => self.window = value,
            ConfigField::Polyorder => self.polyorder = value,
        }
    }

    fn to_config(&self) -> Result<AnalysisConfig, String> {
        fn parse<T: std::str::FromStr>(label: &str, raw: &str) -> Result<T, String> {
            raw.trim()
                .parse()
                .map_err(|_| format!("{label} '{raw}' is not a valid number"))
        }

        Ok(AnalysisConfig::new(
            parse("start threshold", &self.start_threshold)?,
            parse("end threshold", &self.end_threshold)?,
        )
        .with_interpolation_points(parse("interpolation points", &self.points)?)
        .with_smoothing(
            parse("window", &self.window)?,
            parse("polynomial order", &self.polyorder)?,
        ))
    }
}

/// Chart geometry precomputed from an analysis: data-space bounds plus the
/// series to draw.
#[derive(Clone, Default)]
struct PlateauChart {
    samples: Vec<(f64, f64)>,
    curve: Vec<(f64, f64)>,
    markers: Vec<(f64, Color)>,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl PlateauChart {
    fn new(analysis: Option<&PlateauAnalysis>) -> Self {
        let Some(analysis) = analysis else {
            return Self::default();
        };

        let samples: Vec<(f64, f64)> = analysis
            .samples
            .voltages()
            .iter()
            .copied()
            .zip(analysis.samples.counts().iter().copied())
            .collect();
        let curve: Vec<(f64, f64)> = analysis
            .voltages
            .iter()
            .copied()
            .zip(analysis.smoothed.iter().copied())
            .collect();
        let plateau = &analysis.plateau;
        let markers = vec![
            (plateau.plateau_start_voltage, PLATEAU_COLOR),
            (plateau.breakdown_start_voltage, BREAKDOWN_COLOR),
            (plateau.operating_voltage, OPERATING_COLOR),
        ];

        let x_range = StatsHelper::bounds(&analysis.voltages).unwrap_or((0.0, 1.0));
        let counts: Vec<f64> = analysis
            .samples
            .counts()
            .iter()
            .chain(analysis.smoothed.iter())
            .copied()
            .collect();
        let y_range = StatsHelper::bounds(&counts).unwrap_or((0.0, 1.0));

        Self {
            samples,
            curve,
            markers,
            x_range,
            y_range,
        }
    }

    fn project(&self, bounds: Rectangle, (x, y): (f64, f64)) -> Point {
        let margin = 12.0;
        let x_span = (self.x_range.1 - self.x_range.0).max(f64::EPSILON);
        let y_span = (self.y_range.1 - self.y_range.0).max(1.0);
        let nx = ((x - self.x_range.0) / x_span) as f32;
        let ny = ((y - self.y_range.0) / y_span) as f32;
        Point::new(
            margin + nx * (bounds.width - 2.0 * margin),
            bounds.height - margin - ny * (bounds.height - 2.0 * margin),
        )
    }
}

impl canvas::Program<Message> for PlateauChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        let grid = Path::new(|builder| {
            for step in 1..10 {
                let fx = bounds.width * step as f32 / 10.0;
                let fy = bounds.height * step as f32 / 10.0;
                builder.move_to(Point::new(fx, 0.0));
                builder.line_to(Point::new(fx, bounds.height));
                builder.move_to(Point::new(0.0, fy));
                builder.line_to(Point::new(bounds.width, fy));
            }
        });
        frame.stroke(
            &grid,
            Stroke::default()
                .with_width(1.0)
                .with_color(Color::from_rgb(0.18, 0.18, 0.22)),
        );

        if self.curve.len() > 1 {
            let path = Path::new(|builder| {
                for (i, point) in self.curve.iter().enumerate() {
                    let projected = self.project(bounds, *point);
                    if i == 0 {
                        builder.move_to(projected);
                    } else {
                        builder.line_to(projected);
                    }
                }
            });
            frame.stroke(
                &path,
                Stroke::default().with_width(2.5).with_color(CURVE_COLOR),
            );
        }

        for point in &self.samples {
            let marker = Path::new(|builder| builder.circle(self.project(bounds, *point), 4.0));
            frame.fill(&marker, SAMPLE_COLOR);
        }

        // Dashed vertical markers, drawn as short segments.
        for (voltage, color) in &self.markers {
            let x = self.project(bounds, (*voltage, self.y_range.0)).x;
            let dashes = Path::new(|builder| {
                let mut y = 0.0;
                while y < bounds.height {
                    builder.move_to(Point::new(x, y));
                    builder.line_to(Point::new(x, (y + 6.0).min(bounds.height)));
                    y += 10.0;
                }
            });
            frame.stroke(&dashes, Stroke::default().with_width(1.5).with_color(*color));
        }

        vec![frame.into_geometry()]
    }
}
