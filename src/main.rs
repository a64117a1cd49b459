mod style;

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use iced::button::{self, Button};
use iced::canvas::{Cache, Canvas, Cursor, Frame, Geometry, Path, Stroke};
use iced::slider::{self, Slider};
use iced::time;
use iced::{
    Align, Application, Clipboard, Color, Column, Command, Container, Element, HorizontalAlignment,
    Length, Point, Rectangle, Row, Settings, Subscription, VerticalAlignment,
};
use rand::thread_rng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use constellation::error::Error;
use constellation::parameters::{self, Parameters};
use constellation::proximity::{EDGE_STROKE_WIDTH, SEGMENT_STROKE_WIDTH};
use constellation::scene::Scene;

#[derive(Clone, Debug)]
enum Message {
    Tick,
    TogglePlay,
    Randomize,
    ThresholdChanged(f32),
    ParametersLoaded(Parameters),
}

#[derive(Default)]
struct Controls {
    play_button: button::State,
    randomize_button: button::State,
    threshold_slider: slider::State,
}

#[derive(Default)]
struct Constellation {
    state: State,
    controls: Controls,
}

impl Constellation {
    fn configure(&mut self, parameters: Parameters) {
        let scene = Scene::new(&parameters);
        match &scene {
            Ok(_) => info!(
                count = parameters.particle_count,
                threshold = parameters.threshold,
                "configured scene"
            ),
            Err(err) => error!(%err, "rejected parameters"),
        }
        self.state.scene = RefCell::new(scene);
        self.state.parameters = parameters;
        self.state.cache.clear();
    }
}

impl Application for Constellation {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Flags = ();

    fn new(_flags: Self::Flags) -> (Self, Command<Message>) {
        (
            Self::default(),
            Command::perform(
                parameters::load(parameters::path_from_env()),
                Message::ParametersLoaded,
            ),
        )
    }

    fn title(&self) -> String {
        String::from("Constellation")
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.state.is_playing && self.state.scene.borrow().is_ok() {
            time::every(self.state.parameters.tick_interval()).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn update(&mut self, message: Self::Message, _clipboard: &mut Clipboard) -> Command<Message> {
        match message {
            Message::TogglePlay => {
                self.state.is_playing = !self.state.is_playing;
            }
            Message::Tick => {
                if let Ok(scene) = self.state.scene.get_mut() {
                    let start = Instant::now();
                    scene.advance();
                    self.state.last_tick_duration = start.elapsed();
                    self.state.cache.clear();
                }
            }
            Message::Randomize => {
                let reseeded = self.state.scene.get_mut().as_mut().map(|scene| scene.reseed());
                if reseeded.is_ok() {
                    self.state.cache.clear();
                } else {
                    // rebuild a scene that failed to configure
                    self.configure(self.state.parameters.clone());
                }
            }
            Message::ThresholdChanged(threshold) => {
                self.state.parameters.threshold = threshold;
                if let Ok(scene) = self.state.scene.get_mut() {
                    if let Err(err) = scene.set_threshold(threshold) {
                        error!(%err, "rejected threshold");
                    }
                    self.state.cache.clear();
                }
            }
            Message::ParametersLoaded(parameters) => {
                self.configure(parameters);
            }
        }
        Command::none()
    }

    fn view(&mut self) -> Element<Message> {
        let playback_controls = Row::new()
            .spacing(10)
            .push(
                Button::new(
                    &mut self.controls.play_button,
                    iced::widget::Text::new(if self.state.is_playing {
                        "Stop"
                    } else {
                        "Play"
                    }),
                )
                .on_press(Message::TogglePlay)
                .style(style::Button),
            )
            .push(
                Button::new(
                    &mut self.controls.randomize_button,
                    iced::widget::Text::new("Randomize"),
                )
                .on_press(Message::Randomize)
                .style(style::Button),
            );

        let threshold_controls = Row::new()
            .spacing(10)
            .push(
                Slider::new(
                    &mut self.controls.threshold_slider,
                    10.0..=250.0,
                    self.state.parameters.threshold,
                    Message::ThresholdChanged,
                )
                .step(1.0)
                .width(Length::Units(200))
                .style(style::Slider),
            )
            .push(
                iced::widget::Text::new(format!(
                    "Threshold = {:.0}",
                    self.state.parameters.threshold
                ))
                .size(16),
            )
            .align_items(Align::Center);

        let controls = Row::new()
            .spacing(20)
            .push(playback_controls)
            .push(threshold_controls);

        let content = Column::new()
            .spacing(10)
            .padding(10)
            .align_items(Align::Center)
            .push(
                Canvas::new(&mut self.state)
                    .width(Length::Fill)
                    .height(Length::Fill),
            )
            .push(controls);

        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(style::Container)
            .into()
    }
}

struct State {
    scene: RefCell<Result<Scene, Error>>,
    parameters: Parameters,
    is_playing: bool,
    last_tick_duration: Duration,
    edge_count: Cell<usize>,
    bounds_rejected: Cell<bool>,
    cache: Cache,
}

impl Default for State {
    fn default() -> Self {
        let parameters = Parameters::default();
        Self {
            scene: RefCell::new(Scene::new(&parameters)),
            parameters,
            is_playing: true,
            last_tick_duration: Duration::default(),
            edge_count: Cell::new(0),
            bounds_rejected: Cell::new(false),
            cache: Cache::default(),
        }
    }
}

impl State {
    fn color(&self) -> Color {
        let [r, g, b] = self.parameters.color;
        Color::from_rgb(r, g, b)
    }

    fn text_overlay(&self, bounds: Rectangle, content: String) -> Geometry {
        let mut frame = Frame::new(bounds.size());
        frame.fill_text(iced::canvas::Text {
            content,
            color: Color::BLACK,
            size: 14.0,
            position: Point::new(frame.width(), frame.height()),
            horizontal_alignment: HorizontalAlignment::Right,
            vertical_alignment: VerticalAlignment::Bottom,
            ..Default::default()
        });
        frame.into_geometry()
    }
}

impl iced::canvas::Program<Message> for State {
    fn draw(&self, bounds: Rectangle, _cursor: Cursor) -> Vec<Geometry> {
        let mut slot = self.scene.borrow_mut();

        // the field is sized by the first layout that reaches the canvas with positive bounds
        let rejected = match slot.as_mut() {
            Ok(scene) => scene
                .ensure_field(bounds.width, bounds.height, &mut thread_rng())
                .err(),
            Err(_) => None,
        };
        match &rejected {
            Some(err) if !self.bounds_rejected.replace(true) => {
                error!(%err, "could not create particle field")
            }
            Some(_) => {}
            None => self.bounds_rejected.set(false),
        }

        let scene = match slot.as_ref() {
            Ok(scene) => scene,
            Err(err) => {
                return vec![self.text_overlay(bounds, format!("Configuration error: {}", err))];
            }
        };
        if let Some(err) = rejected {
            return vec![self.text_overlay(bounds, format!("Configuration error: {}", err))];
        }

        let color = self.color();
        let start = Instant::now();

        let field_geometry = self.cache.draw(bounds.size(), |frame| {
            let background = Path::rectangle(Point::ORIGIN, frame.size());
            frame.fill(&background, Color::WHITE);

            let draw_list = scene.render().unwrap_or_default();
            self.edge_count.set(draw_list.edges.len());

            for edge in &draw_list.edges {
                frame.stroke(
                    &line(edge.from, edge.to),
                    Stroke {
                        color: Color {
                            a: edge.opacity,
                            ..color
                        },
                        width: EDGE_STROKE_WIDTH,
                        ..Stroke::default()
                    },
                );
            }
            for segment in &draw_list.segments {
                frame.stroke(
                    &line(segment.start, segment.end),
                    Stroke {
                        color,
                        width: SEGMENT_STROKE_WIDTH,
                        ..Stroke::default()
                    },
                );
            }
        });

        let duration = start.elapsed();

        let overlay = self.text_overlay(
            bounds,
            format! {
                "timestep = {}\nlast_tick_duration = {:?}\nDraw duration: {:?}\nParticle count: {}\nEdge count: {}",
                scene.timestep(),
                self.last_tick_duration,
                duration,
                scene.field().map_or(0, |field| field.len()),
                self.edge_count.get(),
            },
        );

        vec![field_geometry, overlay]
    }
}

fn line(from: Point, to: Point) -> Path {
    Path::new(|builder| {
        builder.move_to(from);
        builder.line_to(to);
    })
}

fn main() -> iced::Result {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,constellation=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Constellation::run(Settings {
        antialiasing: true,
        ..Settings::default()
    })
}
