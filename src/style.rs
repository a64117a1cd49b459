use iced::{button, container, slider, Background, Color, Vector};

const ACCENT: Color = Color {
    r: 0.18,
    g: 0.62,
    b: 0.34,
    a: 1.0,
};
const ACCENT_HOVERED: Color = Color {
    r: 0.22,
    g: 0.70,
    b: 0.40,
    a: 1.0,
};
const SURFACE: Color = Color {
    r: 0.96,
    g: 0.96,
    b: 0.96,
    a: 1.0,
};
const RAIL: Color = Color {
    r: 0.80,
    g: 0.80,
    b: 0.80,
    a: 1.0,
};

pub struct Container;

impl container::StyleSheet for Container {
    fn style(&self) -> container::Style {
        container::Style {
            background: Some(Background::Color(SURFACE)),
            text_color: Some(Color::BLACK),
            ..container::Style::default()
        }
    }
}

pub struct Button;

impl button::StyleSheet for Button {
    fn active(&self) -> button::Style {
        button::Style {
            background: Some(Background::Color(ACCENT)),
            border_radius: 4.0,
            shadow_offset: Vector::new(0.0, 0.0),
            text_color: Color::WHITE,
            ..button::Style::default()
        }
    }

    fn hovered(&self) -> button::Style {
        button::Style {
            background: Some(Background::Color(ACCENT_HOVERED)),
            ..self.active()
        }
    }
}

pub struct Slider;

impl slider::StyleSheet for Slider {
    fn active(&self) -> slider::Style {
        slider::Style {
            rail_colors: (RAIL, Color::WHITE),
            handle: slider::Handle {
                shape: slider::HandleShape::Circle { radius: 7.0 },
                color: ACCENT,
                border_width: 0.0,
                border_color: Color::TRANSPARENT,
            },
        }
    }

    fn hovered(&self) -> slider::Style {
        let active = self.active();
        slider::Style {
            handle: slider::Handle {
                color: ACCENT_HOVERED,
                ..active.handle
            },
            ..active
        }
    }

    fn dragging(&self) -> slider::Style {
        self.hovered()
    }
}
