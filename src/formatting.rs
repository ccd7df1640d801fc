use crate::{Cell, Layer, Level};
use fmt::Debug;
use std::fmt;
use std::fmt::{Formatter, Write};

impl Debug for Layer {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Layer {{")?;
            let mut buf = String::new();
            write!(buf, "data: [")?;
            // Write data
            let w = self.width as usize;
            let h = self.height as usize;
            if w == 0 || h == 0 {
                writeln!(buf, "],")?;
            } else {
                for (i, cell) in self.data.iter().enumerate() {
                    if i % w == 0 {
                        // Write newline and padding
                        write!(buf, "\n    ")?;
                    }
                    // Write cell
                    write!(buf, "{cell:#?}")?;
                    // Check if at end
                    if !(i % w == (w - 1) && i / w == h - 1) {
                        write!(buf, ", ")?;
                    }
                }
                writeln!(buf, "\n],")?;
            }
            writeln!(buf, "width: {:?},", self.width)?;
            writeln!(buf, "height: {:?},", self.height)?;
            // Pad lines
            for line in buf.lines() {
                writeln!(f, "    {line}")?;
            }
            write!(f, "}}")
        } else {
            write!(f, "Layer {{ ")?;
            write!(f, "data: {:?}, ", self.data)?;
            write!(f, "width: {:?}, ", self.width)?;
            write!(f, "height: {:?} }}", self.height)
        }
    }
}

impl Debug for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let kind = if self.animated { 'A' } else { 'T' };
        let flip = if self.flipped { "~" } else { "" };
        if f.alternate() {
            // Compact form for grids, events only when present
            write!(f, "{flip}{kind}{:04}", self.id)?;
            if self.event != 0 {
                write!(f, "@{:08X}", self.event)?;
            }
            Ok(())
        } else {
            write!(
                f,
                "Cell({flip}{kind}{}, event: 0x{:08X})",
                self.id, self.event
            )
        }
    }
}

impl Debug for Level {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "Level {{")?;
        let mut buf = String::new();
        writeln!(buf, "version: {},", self.version)?;
        writeln!(buf, "header: {:#?},", self.header)?;
        writeln!(buf, "info: {:#?},", self.info)?;
        writeln!(buf, "layers: {:#?}", self.layers)?;
        // Pad lines
        for line in buf.lines() {
            writeln!(f, "    {line}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use crate::{Cell, Layer};

    #[test]
    fn grid_layout() {
        let mut layer = Layer::new(2, 2);
        layer[(1, 0)] = Cell {
            flipped: true,
            ..Cell::tile(12)
        };
        layer[(0, 1)] = Cell {
            event: 0x20,
            ..Cell::animated(3)
        };
        let pretty = format!("{layer:#?}");
        assert!(pretty.contains("T0000, ~T0012,"));
        assert!(pretty.contains("A0003@00000020, T0000"));
        assert_eq!(
            format!("{:?}", Cell::tile(5)),
            "Cell(T5, event: 0x00000000)"
        );
    }
}
