use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Context;

use crate::model::*;

// Column order inside each event's triplet
const COLUMNS: [Statistic; 3] = [Statistic::Opr, Statistic::Ccwm, Statistic::Dpr];

/*
    One row per team of interest, one OPR/CCWM/DPR triplet per processed event.
    A team that wasn't rated at an event (didn't attend, or the event failed) gets empty cells.
*/
pub fn write_report<W: Write>(writer: W, events: &[Event], teams_of_interest: &[TeamNumber]) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["Team Number".to_string()];
    for ev in events {
        for stat in COLUMNS {
            header.push(format!("{} {}", ev.name, stat.label()));
        }
    }
    csv.write_record(&header)?;

    for &team in teams_of_interest {
        let mut row = vec![team.to_string()];
        for ev in events {
            for stat in COLUMNS {
                row.push(ev.rating(stat, team).map(|v| v.to_string()).unwrap_or_default());
            }
        }
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

pub fn output_report(path: &Path, events: &[Event], teams_of_interest: &[TeamNumber]) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating report {}", path.display()))?;
    write_report(file, events, teams_of_interest).with_context(|| format!("writing report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated_event(key: &str, name: &str, ratings: &[(TeamNumber, f64, f64, f64)]) -> Event {
        let mut ev = Event::new(key, name);
        for &(team, opr, ccwm, dpr) in ratings {
            ev.add_team(team);
            ev.oprs.insert(team, opr);
            ev.ccwms.insert(team, ccwm);
            ev.dprs.insert(team, dpr);
        }
        ev
    }

    fn render(events: &[Event], teams: &[TeamNumber]) -> String {
        let mut out = Vec::new();
        write_report(&mut out, events, teams).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn one_triplet_per_event() {
        let events = vec![
            rated_event("2013casd", "San Diego", &[(254, 40.5, 10.0, 30.5)]),
            rated_event("2013cama", "Central Valley", &[(254, 35.0, -2.0, 37.0), (1678, 20.0, 1.5, 18.5)]),
        ];

        let report = render(&events, &[254, 1678]);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(
            lines[0],
            "Team Number,San Diego OPR,San Diego CCWM,San Diego DPR,Central Valley OPR,Central Valley CCWM,Central Valley DPR"
        );
        assert_eq!(lines[1], "254,40.5,10,30.5,35,-2,37");
        assert_eq!(lines[2], "1678,,,,20,1.5,18.5");
    }

    #[test]
    fn team_without_ratings_gets_an_empty_row() {
        let events = vec![rated_event("2013casd", "San Diego", &[(254, 40.0, 0.0, 40.0)])];
        let report = render(&events, &[9999]);

        assert_eq!(report.lines().nth(1), Some("9999,,,"));
    }

    #[test]
    fn writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");

        output_report(&path, &[], &[254]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Team Number\n254\n");
    }
}
