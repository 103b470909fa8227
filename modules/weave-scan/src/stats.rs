/// Stats from one scan pass.
#[derive(Debug, Default)]
pub struct ScanStats {
    pub events_scanned: u32,
    pub unclassified: u32,
    pub classified: u32,
    pub names_extracted: u32,
    pub events_attributed: u32,
    pub already_logged: u32,
    pub suppressed: u32,
    pub ambiguous: u32,
    pub surfaced: u32,
}

impl std::fmt::Display for ScanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Calendar Scan Complete ===")?;
        writeln!(f, "Events scanned:    {}", self.events_scanned)?;
        writeln!(f, "Unclassified:      {}", self.unclassified)?;
        writeln!(f, "Classified:        {}", self.classified)?;
        writeln!(f, "Names extracted:   {}", self.names_extracted)?;
        writeln!(f, "Attributed:        {}", self.events_attributed)?;
        writeln!(f, "Already logged:    {}", self.already_logged)?;
        writeln!(f, "Suppressed:        {}", self.suppressed)?;
        writeln!(f, "Ambiguous:         {}", self.ambiguous)?;
        writeln!(f, "Surfaced:          {}", self.surfaced)?;
        let total = self.events_scanned.max(1);
        writeln!(
            f,
            "Candidate rate:    {:.0}%",
            self.surfaced as f64 / total as f64 * 100.0
        )
    }
}
