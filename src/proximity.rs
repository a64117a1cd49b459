use iced::{Point, Vector};

use crate::error::{Error, Result};
use crate::field::Particle;

pub const EDGE_STROKE_WIDTH: f32 = 0.5;
pub const SEGMENT_STROKE_WIDTH: f32 = 1.0;

/// A pair of particles closer than the threshold. Only lives for one render pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub i: usize,
    pub j: usize,
    pub distance: f32,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeLine {
    pub from: Point,
    pub to: Point,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// Lines to stroke for one frame: edges underneath, particle segments on top.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    pub edges: Vec<EdgeLine>,
    pub segments: Vec<Segment>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProximityRenderer {
    threshold: f32,
}

impl ProximityRenderer {
    pub fn new(threshold: f32) -> Result<Self> {
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(Error::InvalidThreshold(threshold));
        }
        Ok(ProximityRenderer { threshold })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Every pair `i < j` closer than the threshold, in ascending `(i, j)` order.
    pub fn compute_edges(&self, particles: &[Particle]) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (i, a) in particles.iter().enumerate() {
            let a = a.position();
            for (j, b) in particles.iter().enumerate().skip(i + 1) {
                let b = b.position();
                let dx = a.x - b.x;
                let dy = a.y - b.y;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance < self.threshold {
                    edges.push(Edge {
                        i,
                        j,
                        distance,
                        opacity: 1.0 - distance / self.threshold,
                    });
                }
            }
        }
        edges
    }

    pub fn render(&self, particles: &[Particle]) -> DrawList {
        let edges = self
            .compute_edges(particles)
            .into_iter()
            .map(|edge| EdgeLine {
                from: particles[edge.i].position(),
                to: particles[edge.j].position(),
                opacity: edge.opacity,
            })
            .collect();
        let segments = particles.iter().map(compute_segment).collect();
        DrawList { edges, segments }
    }
}

/// The particle's line, centered on its position and oriented along its angle.
pub fn compute_segment(particle: &Particle) -> Segment {
    let half = particle.length() / 2.0;
    let offset = Vector::new(particle.angle().cos() * half, particle.angle().sin() * half);
    Segment {
        start: particle.position() - offset,
        end: particle.position() + offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ParticleField;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f32 = 1e-3;

    fn at(x: f32, y: f32) -> Particle {
        Particle::new(Point::new(x, y), Vector::new(0.0, 0.0), 0.0, 20.0)
    }

    fn renderer() -> ProximityRenderer {
        ProximityRenderer::new(100.0).unwrap()
    }

    fn distance(a: Point, b: Point) -> f32 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn test_single_edge_at_half_threshold() {
        let edges = renderer().compute_edges(&[at(0.0, 0.0), at(50.0, 0.0)]);
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].i, edges[0].j), (0, 1));
        assert!((edges[0].distance - 50.0).abs() < EPS);
        assert!((edges[0].opacity - 0.5).abs() < EPS);
    }

    #[test]
    fn test_no_edge_beyond_threshold() {
        let edges = renderer().compute_edges(&[at(0.0, 0.0), at(150.0, 0.0)]);
        assert!(edges.is_empty());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let edges = renderer().compute_edges(&[at(0.0, 0.0), at(100.0, 0.0)]);
        assert!(edges.is_empty());
    }

    #[test]
    fn test_coincident_particles_are_fully_opaque() {
        let edges = renderer().compute_edges(&[at(10.0, 10.0), at(10.0, 10.0)]);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].opacity, 1.0);
    }

    #[test]
    fn test_opacity_decreases_with_distance() {
        let particles = [at(0.0, 0.0), at(10.0, 0.0), at(0.0, 60.0), at(99.9, 0.0)];
        let edges = renderer().compute_edges(&particles);
        let from_origin: Vec<&Edge> = edges.iter().filter(|e| e.i == 0).collect();
        assert_eq!(from_origin.len(), 3);
        for pair in from_origin.windows(2) {
            assert!(pair[0].distance < pair[1].distance);
            assert!(pair[0].opacity > pair[1].opacity);
        }
        let nearest_threshold = from_origin[2];
        assert!(nearest_threshold.opacity > 0.0 && nearest_threshold.opacity < 0.01);
    }

    #[test]
    fn test_edges_are_ordered_unique_and_within_threshold() {
        let mut rng = StdRng::seed_from_u64(11);
        let field = ParticleField::initialize(150, 400.0, 300.0, &mut rng).unwrap();
        let particles = field.particles();
        let edges = renderer().compute_edges(particles);
        assert!(!edges.is_empty());

        let mut expected = 0;
        for i in 0..particles.len() {
            for j in i + 1..particles.len() {
                if distance(particles[i].position(), particles[j].position()) < 100.0 {
                    expected += 1;
                }
            }
        }
        assert_eq!(edges.len(), expected);

        for pair in edges.windows(2) {
            assert!((pair[0].i, pair[0].j) < (pair[1].i, pair[1].j));
        }
        for edge in &edges {
            assert!(edge.i < edge.j);
            assert!(edge.distance < 100.0);
            assert!(edge.opacity > 0.0 && edge.opacity <= 1.0);
        }
    }

    #[test]
    fn test_rejects_degenerate_threshold() {
        for threshold in [0.0, -1.0, f32::NAN, f32::INFINITY].iter() {
            assert!(matches!(
                ProximityRenderer::new(*threshold),
                Err(Error::InvalidThreshold(_))
            ));
        }
    }

    #[test]
    fn test_horizontal_segment() {
        let segment = compute_segment(&at(40.0, 25.0));
        assert!((segment.start.x - 30.0).abs() < EPS);
        assert!((segment.start.y - 25.0).abs() < EPS);
        assert!((segment.end.x - 50.0).abs() < EPS);
        assert!((segment.end.y - 25.0).abs() < EPS);
    }

    #[test]
    fn test_segment_is_symmetric_about_position() {
        let mut rng = StdRng::seed_from_u64(5);
        let field = ParticleField::initialize(50, 300.0, 300.0, &mut rng).unwrap();
        for p in field.particles() {
            let segment = compute_segment(p);
            let half = p.length() / 2.0;
            assert!((distance(segment.start, p.position()) - half).abs() < EPS);
            assert!((distance(segment.end, p.position()) - half).abs() < EPS);

            let direction = segment.end - segment.start;
            assert!((direction.x - p.angle().cos() * p.length()).abs() < EPS);
            assert!((direction.y - p.angle().sin() * p.length()).abs() < EPS);
        }
    }

    #[test]
    fn test_render_layers() {
        let particles = [at(0.0, 0.0), at(50.0, 0.0), at(300.0, 300.0)];
        let list = renderer().render(&particles);
        assert_eq!(list.edges.len(), 1);
        assert_eq!(list.edges[0].from, Point::new(0.0, 0.0));
        assert_eq!(list.edges[0].to, Point::new(50.0, 0.0));
        assert!((list.edges[0].opacity - 0.5).abs() < EPS);
        assert_eq!(list.segments.len(), 3);
        assert_eq!(list.segments[2], compute_segment(&particles[2]));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(renderer().render(&[]), DrawList::default());
    }
}
