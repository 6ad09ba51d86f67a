//! Screen-space geometry produced by the layout engines.

/// A 2D point in canvas units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Point {
	/// Construct a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}

	/// Point on a circle of `radius` around `self`, `degrees` clockwise from
	/// twelve o'clock.
	pub fn polar(self, degrees: f64, radius: f64) -> Point {
		let theta = degrees.to_radians();
		Point::new(self.x + radius * theta.sin(), self.y - radius * theta.cos())
	}
}

/// One drawing instruction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
	/// Start a new sub-path.
	MoveTo(Point),
	/// Straight segment.
	LineTo(Point),
	/// Quadratic Bézier segment.
	QuadTo {
		/// Control point.
		ctrl: Point,
		/// End point.
		to: Point,
	},
	/// Cubic Bézier segment.
	CubicTo {
		/// First control point.
		ctrl1: Point,
		/// Second control point.
		ctrl2: Point,
		/// End point.
		to: Point,
	},
}

/// An open path, replayed onto the canvas by the renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
	commands: Vec<PathCommand>,
}

impl Path {
	/// Empty path.
	pub fn new() -> Self {
		Self::default()
	}

	/// Straight segment from `a` to `b`.
	pub fn line(a: Point, b: Point) -> Self {
		let mut path = Self::new();
		path.move_to(a);
		path.line_to(b);
		path
	}

	/// Uniform cubic B-spline through the control polygon `points`, clamped
	/// to start at the first point and end at the last.
	pub fn basis(points: &[Point]) -> Self {
		let mut path = Self::new();
		let (mut p0, mut p1) = (Point::default(), Point::default());
		for (i, &p) in points.iter().enumerate() {
			match i {
				0 => path.move_to(p),
				1 => {}
				2 => {
					path.line_to(Point::new((5.0 * p0.x + p1.x) / 6.0, (5.0 * p0.y + p1.y) / 6.0));
					path.basis_segment(p0, p1, p);
				}
				_ => path.basis_segment(p0, p1, p),
			}
			(p0, p1) = (p1, p);
		}
		match points.len() {
			0 | 1 => {}
			2 => path.line_to(p1),
			_ => {
				path.basis_segment(p0, p1, p1);
				path.line_to(p1);
			}
		}
		path
	}

	/// B-spline through `points` after pulling every interior point towards
	/// the straight line between the ends. `beta` of 1 keeps the control
	/// polygon, 0 gives a straight line.
	pub fn bundle(points: &[Point], beta: f64) -> Self {
		let Some((&first, &last)) = points.first().zip(points.last()) else {
			return Self::new();
		};
		let j = points.len() - 1;
		if j == 0 {
			return Self::basis(points);
		}
		let (dx, dy) = (last.x - first.x, last.y - first.y);
		let straightened: Vec<Point> = points
			.iter()
			.enumerate()
			.map(|(i, p)| {
				if i == 0 || i == j {
					return *p;
				}
				let t = i as f64 / j as f64;
				Point::new(
					beta * p.x + (1.0 - beta) * (first.x + t * dx),
					beta * p.y + (1.0 - beta) * (first.y + t * dy),
				)
			})
			.collect();
		Self::basis(&straightened)
	}

	fn basis_segment(&mut self, p0: Point, p1: Point, p: Point) {
		self.cubic_to(
			Point::new((2.0 * p0.x + p1.x) / 3.0, (2.0 * p0.y + p1.y) / 3.0),
			Point::new((p0.x + 2.0 * p1.x) / 3.0, (p0.y + 2.0 * p1.y) / 3.0),
			Point::new((p0.x + 4.0 * p1.x + p.x) / 6.0, (p0.y + 4.0 * p1.y + p.y) / 6.0),
		);
	}

	/// Begin a sub-path at `p`.
	pub fn move_to(&mut self, p: Point) {
		self.commands.push(PathCommand::MoveTo(p));
	}

	/// Straight segment to `p`.
	pub fn line_to(&mut self, p: Point) {
		self.commands.push(PathCommand::LineTo(p));
	}

	/// Quadratic segment to `to`.
	pub fn quad_to(&mut self, ctrl: Point, to: Point) {
		self.commands.push(PathCommand::QuadTo { ctrl, to });
	}

	/// Cubic segment to `to`.
	pub fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
		self.commands.push(PathCommand::CubicTo { ctrl1, ctrl2, to });
	}

	/// Recorded commands.
	pub fn commands(&self) -> &[PathCommand] {
		&self.commands
	}

	/// Whether nothing would be drawn.
	pub fn is_empty(&self) -> bool {
		self.commands.len() < 2
	}

	/// Last point reached by the path.
	pub fn end(&self) -> Option<Point> {
		self.commands.last().map(|cmd| match *cmd {
			PathCommand::MoveTo(p) | PathCommand::LineTo(p) => p,
			PathCommand::QuadTo { to, .. } | PathCommand::CubicTo { to, .. } => to,
		})
	}
}
