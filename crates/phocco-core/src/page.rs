//! HTML page assembly for documented source files.

use std::fmt::{self, Write};
use std::path::{Path, PathBuf};

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::segment::Section;

/// Renders the two-column literate page for one source file.
pub struct PageRenderer;

impl PageRenderer {
    /// Render a page.
    ///
    /// `sources` lists the stems of every file documented in this run; a
    /// jump-to menu is written when there is more than one.
    pub fn render(title: &str, sources: &[String], sections: &[Section]) -> Result<String, fmt::Error> {
        let mut output = String::new();

        writeln!(output, "<!DOCTYPE html>")?;
        writeln!(output, "<html lang=\"en\">")?;
        writeln!(output, "<head>")?;
        writeln!(output, "  <meta charset=\"UTF-8\">")?;
        writeln!(
            output,
            "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
        )?;
        writeln!(output, "  <title>{}</title>", encode_text(title))?;
        Self::write_styles(&mut output)?;
        writeln!(output, "</head>")?;
        writeln!(output, "<body>")?;
        writeln!(output, "<div id=\"container\">")?;
        writeln!(output, "  <div id=\"background\"></div>")?;

        if sources.len() > 1 {
            Self::write_jump_menu(&mut output, sources)?;
        }

        writeln!(output, "  <table cellpadding=\"0\" cellspacing=\"0\">")?;
        writeln!(output, "    <thead>")?;
        writeln!(output, "      <tr>")?;
        writeln!(output, "        <th class=\"docs\"><h1>{}</h1></th>", encode_text(title))?;
        writeln!(output, "        <th class=\"code\"></th>")?;
        writeln!(output, "      </tr>")?;
        writeln!(output, "    </thead>")?;
        writeln!(output, "    <tbody>")?;
        for section in sections {
            Self::write_section(&mut output, section)?;
        }
        writeln!(output, "    </tbody>")?;
        writeln!(output, "  </table>")?;
        writeln!(output, "</div>")?;
        writeln!(output, "</body>")?;
        writeln!(output, "</html>")?;

        Ok(output)
    }

    fn write_jump_menu(output: &mut String, sources: &[String]) -> fmt::Result {
        writeln!(output, "  <div id=\"jump_to\">")?;
        writeln!(output, "    Jump To &hellip;")?;
        writeln!(output, "    <div id=\"jump_wrapper\">")?;
        writeln!(output, "      <div id=\"jump_page\">")?;
        for source in sources {
            writeln!(
                output,
                "        <a class=\"source\" href=\"{}.html\">{}</a>",
                encode_double_quoted_attribute(source),
                encode_text(source)
            )?;
        }
        writeln!(output, "      </div>")?;
        writeln!(output, "    </div>")?;
        writeln!(output, "  </div>")
    }

    fn write_section(output: &mut String, section: &Section) -> fmt::Result {
        let index = section.index();
        writeln!(output, "      <tr id=\"section-{index}\">")?;
        writeln!(output, "        <td class=\"docs\">")?;
        writeln!(output, "          <div class=\"pilwrap\">")?;
        writeln!(
            output,
            "            <a class=\"pilcrow\" href=\"#section-{index}\">&#182;</a>"
        )?;
        writeln!(output, "          </div>")?;
        writeln!(output, "          {}", section.docs_html().unwrap_or_default())?;
        writeln!(output, "        </td>")?;
        writeln!(output, "        <td class=\"code\">")?;
        writeln!(output, "          {}", section.code_html().unwrap_or_default())?;
        writeln!(output, "        </td>")?;
        writeln!(output, "      </tr>")
    }

    fn write_styles(output: &mut String) -> fmt::Result {
        writeln!(output, "<style>")?;
        writeln!(
            output,
            r#"
body {{
  font-family: 'Palatino Linotype', 'Book Antiqua', Palatino, FreeSerif, serif;
  font-size: 15px;
  line-height: 22px;
  color: #252519;
  margin: 0;
  padding: 0;
}}

a {{
  color: #261a3b;
}}

a:visited {{
  color: #261a3b;
}}

#container {{
  position: relative;
}}

#background {{
  position: fixed;
  top: 0;
  left: 525px;
  right: 0;
  bottom: 0;
  background: #f5f5ff;
  border-left: 1px solid #e5e5ee;
  z-index: -1;
}}

#jump_to, #jump_page {{
  background: white;
  box-shadow: 0 0 25px #777;
  font: 10px Arial;
  text-transform: uppercase;
  cursor: pointer;
  text-align: right;
}}

#jump_to, #jump_wrapper {{
  position: fixed;
  right: 0;
  top: 0;
  padding: 5px 10px;
}}

#jump_wrapper {{
  padding: 0;
  display: none;
}}

#jump_to:hover #jump_wrapper {{
  display: block;
}}

#jump_page {{
  padding: 5px 0 3px;
  margin: 0 0 25px 25px;
}}

#jump_page .source {{
  display: block;
  padding: 5px 10px;
  text-decoration: none;
  border-top: 1px solid #eee;
}}

table td {{
  border: 0;
  outline: 0;
}}

td.docs, th.docs {{
  max-width: 450px;
  min-width: 450px;
  min-height: 5px;
  padding: 10px 25px 1px 50px;
  overflow-x: hidden;
  vertical-align: top;
  text-align: left;
}}

.docs pre {{
  margin: 15px 0 15px;
  padding-left: 15px;
}}

.docs p tt, .docs p code {{
  background: #f8f8ff;
  border: 1px solid #dedede;
  font-size: 12px;
  padding: 0 0.2em;
}}

.pilwrap {{
  position: relative;
}}

.pilcrow {{
  font: 12px Arial;
  text-decoration: none;
  color: #454545;
  position: absolute;
  top: 3px;
  left: -20px;
  padding: 1px 2px;
  opacity: 0;
}}

td.docs:hover .pilcrow {{
  opacity: 1;
}}

td.code, th.code {{
  padding: 14px 15px 16px 25px;
  width: 100%;
  vertical-align: top;
  background: #f5f5ff;
  border-left: 1px solid #e5e5ee;
}}

pre, tt, code {{
  font-size: 12px;
  line-height: 18px;
  font-family: Monaco, Consolas, "Lucida Console", monospace;
  margin: 0;
  padding: 0;
}}

.highlight .c, .highlight .c1, .highlight .cm {{ color: #408080; font-style: italic }}
.highlight .k, .highlight .kd, .highlight .kn {{ color: #954121 }}
.highlight .s, .highlight .s1, .highlight .s2 {{ color: #219161 }}
.highlight .m, .highlight .mi, .highlight .mf {{ color: #666666 }}
.highlight .nf, .highlight .nc {{ color: #19469d }}
.highlight .nv, .highlight .vg, .highlight .vi {{ color: #19469d }}
.highlight .o, .highlight .ow {{ color: #666666 }}
"#
        )?;
        writeln!(output, "</style>")
    }
}

/// File stem used for a source's page and its jump-to entry.
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `<output_dir>/<stem>.html` for a source file.
pub fn output_path(output_dir: &Path, source: &Path) -> PathBuf {
    output_dir.join(format!("{}.html", source_stem(source)))
}
