pub const SBATCH_MARKER: &str = "#SBATCH";
pub const INLINE_COMMENT: char = '#';

/// How directive lines are recognized inside a script.
#[derive(Debug, Clone)]
pub struct DirectiveSyntax {
    pub marker: &'static str,
    pub comment: char,
}

impl Default for DirectiveSyntax {
    fn default() -> Self {
        Self {
            marker: SBATCH_MARKER,
            comment: INLINE_COMMENT,
        }
    }
}

/// Cleaned content of a single directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveLine {
    /// 1-based line number within the script.
    pub line: usize,
    pub body: String,
}

impl DirectiveSyntax {
    pub fn is_directive(&self, line: &str) -> bool {
        line.trim().starts_with(self.marker)
    }

    /// Removes all markers and the trailing inline comment from a directive line.
    pub fn clean(&self, line: &str) -> String {
        let line = line.replace(self.marker, "");
        let line = match line.find(self.comment) {
            Some(position) => &line[..position],
            None => line.as_str(),
        };
        line.trim().to_string()
    }
}

/// Returns the cleaned bodies of all directive lines of `script` in document order.
/// Marker-only lines produce an empty body.
pub fn extract_directives(script: &str, syntax: &DirectiveSyntax) -> Vec<DirectiveLine> {
    script
        .lines()
        .enumerate()
        .filter(|(_, line)| syntax.is_directive(line))
        .map(|(index, line)| {
            let body = syntax.clean(line);
            log::trace!("Directive at line {}: {body:?}", index + 1);
            DirectiveLine {
                line: index + 1,
                body,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{DirectiveLine, DirectiveSyntax, extract_directives};

    fn bodies(script: &str) -> Vec<String> {
        extract_directives(script, &DirectiveSyntax::default())
            .into_iter()
            .map(|line| line.body)
            .collect()
    }

    #[test]
    fn test_extract_directives() {
        let script = "#!/bin/bash

# Comment
#SBATCH --abc --xyz

#SBATCH
  #SBATCH next arg
sleep 1
#SBATCH --after-command
";
        assert_eq!(
            extract_directives(script, &DirectiveSyntax::default()),
            vec![
                DirectiveLine {
                    line: 4,
                    body: "--abc --xyz".to_string()
                },
                DirectiveLine {
                    line: 6,
                    body: "".to_string()
                },
                DirectiveLine {
                    line: 7,
                    body: "next arg".to_string()
                },
                DirectiveLine {
                    line: 9,
                    body: "--after-command".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_no_directives() {
        assert!(bodies("").is_empty());
        assert!(bodies("#!/bin/sh\necho hello\n# SBATCH --nodes=2\n").is_empty());
    }

    #[test]
    fn test_doubled_marker_is_not_directive() {
        assert!(bodies("##SBATCH --nodes=2").is_empty());
        assert!(bodies("# #SBATCH --nodes=2").is_empty());
    }

    #[test]
    fn test_inline_comment() {
        assert_eq!(
            bodies("#SBATCH --nodes=2 # two nodes\n#SBATCH -J x#y"),
            vec!["--nodes=2", "-J x"]
        );
    }

    #[test]
    fn test_repeated_marker_is_removed() {
        assert_eq!(bodies("#SBATCH #SBATCH"), vec![""]);
        assert_eq!(bodies("#SBATCH --nodes=2 #SBATCH"), vec!["--nodes=2"]);
    }

    #[test]
    fn test_marker_without_space() {
        assert_eq!(bodies("#SBATCH--nodes=2"), vec!["--nodes=2"]);
    }

    #[test]
    fn test_windows_line_endings() {
        assert_eq!(
            bodies("#SBATCH --nodes=2\r\n#SBATCH -J x\r\n"),
            vec!["--nodes=2", "-J x"]
        );
    }
}
