/*!

This is the long-form manual for `roll_call` and the `rollcall` command line program.

## Input files

Both roster files and attendance exports are read as tables: the first sheet of a
workbook (`xlsx`, `xls`, `xlsm`, `ods`) or a `csv` file.

Meeting providers often put a few title or comment lines above the header. Lines whose
first cell is empty or starts with `*` are skipped; the first other line is the header.

### Roster files

The student names are read from the first column found among (in this order):
`full name`, `name`, `student name`, `student`. Headers are compared without regard
to case or surrounding spaces.

Names are stored cleaned: batch codes such as `BCR78`, `(CMBCR 12)` are removed, spaces
are collapsed and the name is put in title case. A name is only added once.

### Attendance exports

Two columns are required:
- the name, with the same headers as roster files
- the time spent in the call, with the headers `time in call`, `time`, `duration`,
  `call time`, `call duration`

The time can be a number of minutes, `H:MM:SS` or `MM:SS`. Values that cannot be read
count as 0 minutes.

## Matching

An attendee is matched to a roster entry when both names give the same key after:
- lowercasing
- removing a ` cm` suffix
- writing all of `mohammed`, `mohammad`, `muhammad` as `muhammed`
- removing every space

Attendees that are present (at least the threshold, 48 minutes by default) but not on
the roster are reported as alternative students. Rows from meeting bots (`AI Notetaker`,
`tldv.io`) and from the trainer are ignored.

## State file

`rollcall` keeps its state in a JSON file (`rollcall.json` by default, see `--state`):

```json
{
  "students": ["Ali Khan", "Sara Malik"],
  "reportSettings": {
    "batchName": "BCR78",
    "reportDate": "2024-03-07",
    "trainerName": "Usman Tariq",
    "coordinators": "Hina, Omar",
    "reportCreator": "Bilal",
    "tldvLink": "",
    "sessionSummary": ""
  },
  "attendanceSettings": { "timeThreshold": 48, "timeFormat": "hms" }
}
```

Every key is optional. The report date is used as `YYYY-MM-DD`; when it is missing,
today's date is printed.

## Report

Sections are printed in this order, each one only when it has content: metadata,
recording link, session summary, present participants, alternative students, absentees.

Alternative students are left out for classes of more than 40 records. Their original
names (with batch codes) are shown when fewer than 40 students were present in total,
their cleaned names otherwise.

 */
