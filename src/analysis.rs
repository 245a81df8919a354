use crate::model::*;
use crate::util::mean;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    pub alliances: usize,
    pub mean_abs_error: f64,
    pub rmse: f64,
    // Share of decided matches whose winner had the larger OPR sum
    pub winner_accuracy: f64,
}

// How well summed OPRs predict the alliance scores they were fitted on. Unrated teams count as zero.
pub fn analyze_fit(event: &Event) -> FitReport {
    let predict = |teams: &[TeamNumber]| -> f64 { teams.iter().filter_map(|&t| event.rating(Statistic::Opr, t)).sum() };

    let mut errors = Vec::new();
    let mut decided = 0;
    let mut called = 0;

    for m in &event.matches {
        let red = predict(&m.red.teams);
        let blue = predict(&m.blue.teams);

        errors.push(red - m.red.score as f64);
        errors.push(blue - m.blue.score as f64);

        if m.red.score != m.blue.score {
            decided += 1;
            if (red > blue) == (m.red.score > m.blue.score) {
                called += 1;
            }
        }
    }

    let abs: Vec<f64> = errors.iter().map(|e| e.abs()).collect();
    let squared: Vec<f64> = errors.iter().map(|e| e * e).collect();

    FitReport {
        alliances: errors.len(),
        mean_abs_error: mean(&abs),
        rmse: mean(&squared).sqrt(),
        winner_accuracy: if decided == 0 { 0.0 } else { called as f64 / decided as f64 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_ratings_have_no_error() {
        let mut event = Event::new("2013test", "Test");
        event.oprs.extend([(1, 30.0), (2, 20.0), (3, 10.0), (4, 5.0)]);
        event.add_match(Match {
            red: Alliance { teams: vec![1, 2], score: 50 },
            blue: Alliance { teams: vec![3, 4], score: 15 },
            level: CompetitionLevel::Qualification,
        });

        let fit = analyze_fit(&event);
        assert_eq!(fit.alliances, 2);
        assert_eq!(fit.mean_abs_error, 0.0);
        assert_eq!(fit.rmse, 0.0);
        assert_eq!(fit.winner_accuracy, 1.0);
    }

    #[test]
    fn upset_lowers_accuracy() {
        let mut event = Event::new("2013test", "Test");
        event.oprs.extend([(1, 30.0), (2, 10.0)]);
        event.add_match(Match {
            red: Alliance { teams: vec![1], score: 10 },
            blue: Alliance { teams: vec![2], score: 30 },
            level: CompetitionLevel::Elimination,
        });

        let fit = analyze_fit(&event);
        assert_eq!(fit.mean_abs_error, 20.0);
        assert_eq!(fit.winner_accuracy, 0.0);
    }

    #[test]
    fn no_matches_no_error() {
        let fit = analyze_fit(&Event::new("2013test", "Test"));
        assert_eq!(fit.alliances, 0);
        assert_eq!(fit.rmse, 0.0);
    }
}
