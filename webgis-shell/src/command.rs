use anyhow::{anyhow, bail, Context, Result};
use webgis::boundary::BoundaryKind;
use webgis::control::{MouseButton, RawUserEvent};
use webgis::viewer::{BaseLayerChoice, ViewerEvent};
use webgis_types::{latlon, Point2d, Size};

pub const HELP: &str = "\
commands:
  base osm|carto|commercial   select the base layer
  provinces on|off            toggle the provinces layers
  counties on|off             toggle the counties layers
  click <x> <y>               click at a pixel of the visible surface
  pick <lat> <lon>            click at a geographic point of the visible surface
  drag <dx> <dy>              drag the primary surface by pixels
  zoom <steps>                scroll at the primary surface center
  resize <width> <height>     change the surface size
  status                      print the status line and the view
  quit                        exit";

/// A parsed input line.
#[derive(Debug)]
pub enum Command {
    Events(Vec<ViewerEvent>),
    Status,
    Help,
    Quit,
}

/// Parses an input line. `surface_size` is used to place drags and scrolls at the surface center.
pub fn parse(line: &str, surface_size: Size) -> Result<Command> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(Command::Events(vec![]));
    };
    let args: Vec<&str> = words.collect();

    let command = match (name, args.as_slice()) {
        ("base", [choice]) => Command::Events(vec![ViewerEvent::SelectBase(
            choice.parse::<BaseLayerChoice>()?,
        )]),
        ("provinces", [state]) => Command::Events(vec![ViewerEvent::SetBoundaryVisible(
            BoundaryKind::Province,
            parse_switch(state)?,
        )]),
        ("counties", [state]) => Command::Events(vec![ViewerEvent::SetBoundaryVisible(
            BoundaryKind::County,
            parse_switch(state)?,
        )]),
        ("click", [x, y]) => {
            Command::Events(vec![ViewerEvent::Click(Point2d::new(number(x)?, number(y)?))])
        }
        ("pick", [lat, lon]) => {
            Command::Events(vec![ViewerEvent::Pick(latlon!(number(lat)?, number(lon)?))])
        }
        ("drag", [dx, dy]) => {
            let from = center(surface_size);
            let to = Point2d::new(from.x + number(dx)?, from.y + number(dy)?);
            Command::Events(
                [
                    RawUserEvent::PointerMoved(from),
                    RawUserEvent::ButtonPressed(MouseButton::Left),
                    RawUserEvent::PointerMoved(to),
                    RawUserEvent::ButtonReleased(MouseButton::Left),
                ]
                .into_iter()
                .map(ViewerEvent::Input)
                .collect(),
            )
        }
        ("zoom", [steps]) => Command::Events(vec![
            ViewerEvent::Input(RawUserEvent::PointerMoved(center(surface_size))),
            ViewerEvent::Input(RawUserEvent::Scroll(number(steps)?)),
        ]),
        ("resize", [width, height]) => Command::Events(vec![ViewerEvent::Resize(Size::new(
            number(width)?,
            number(height)?,
        ))]),
        ("status", []) => Command::Status,
        ("help", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        _ => bail!("cannot parse `{line}`, type `help` for the list of commands"),
    };

    Ok(command)
}

fn parse_switch(value: &str) -> Result<bool> {
    match value {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(anyhow!("expected on or off, got {value}")),
    }
}

fn number(value: &str) -> Result<f64> {
    value
        .parse()
        .with_context(|| format!("{value} is not a number"))
}

fn center(size: Size) -> Point2d {
    Point2d::new(size.half_width(), size.half_height())
}
